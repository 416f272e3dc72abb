//! Application layer - handlers, persistence orchestration and the session
//! facade.
//!
//! Handlers apply each change to in-memory state first and persist it
//! afterwards through the [`TierChain`](persistence::TierChain). Outcomes
//! come back as values; user-facing feedback goes through the `Notifier`.

mod error;
pub mod handlers;
pub mod persistence;
mod reconciliation;
mod session;

pub use error::AssistantError;
pub use reconciliation::ReconciliationPolicy;
pub use session::{AssistantSession, AssistantSessionBuilder, LoadSummary};
