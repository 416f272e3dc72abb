//! Persistence orchestration: the tier chain and the read-side data source.

mod chain;
mod data_source;

pub use chain::{ChainOutcome, TierChain, TierChainBuilder, TierFailure, SAVED_LOCALLY};
pub use data_source::DataSource;
