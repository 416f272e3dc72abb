//! Persistence tier adapters, in chain order.

mod local_tier;
mod noop_tier;
mod remote_tier;

pub use local_tier::LocalTier;
pub use noop_tier::NoOpTier;
pub use remote_tier::RemoteTier;
