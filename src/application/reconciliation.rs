//! What to do with an optimistic change when persistence fails.

use serde::Deserialize;

/// Applies to insight dismissal and message ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationPolicy {
    /// The in-memory change stands no matter what the chain reports.
    #[default]
    KeepOptimistic,
    /// Undo the change when the write ended in the no-op tier after a
    /// failure.
    RevertOnFailure,
}

impl ReconciliationPolicy {
    pub fn reverts(&self, durable: bool, degraded: bool) -> bool {
        matches!(self, ReconciliationPolicy::RevertOnFailure) && !durable && degraded
    }
}
