//! No-op tier - the terminal tier of every chain.

use async_trait::async_trait;

use crate::domain::foundation::Identity;
use crate::ports::{
    DurableWrite, PersistenceError, PersistenceTier, ReadQuery, ReadResult, TierKind,
    WriteReceipt,
};

/// Accepts everything and stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTier;

#[async_trait]
impl PersistenceTier for NoOpTier {
    fn kind(&self) -> TierKind {
        TierKind::NoOp
    }

    fn is_available(&self, _identity: &Identity) -> bool {
        true
    }

    async fn write(
        &self,
        _identity: &Identity,
        write: &DurableWrite,
    ) -> Result<WriteReceipt, PersistenceError> {
        tracing::debug!(write = write.label(), "write discarded");
        Ok(WriteReceipt::Discarded)
    }

    async fn read(
        &self,
        _identity: &Identity,
        _query: &ReadQuery,
    ) -> Result<ReadResult, PersistenceError> {
        Ok(ReadResult::Nothing)
    }
}
