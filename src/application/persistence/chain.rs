//! Tier chain - ordered fallback over persistence tiers.
//!
//! Tiers are attempted strictly in order, one at a time. Unavailable tiers
//! are skipped, tiers that do not serve an operation are skipped, and the
//! first success short-circuits. The no-op tier is always last, so every
//! call resolves to an outcome rather than an error.

use std::future::Future;
use std::sync::Arc;

use crate::adapters::tiers::{LocalTier, NoOpTier, RemoteTier};
use crate::domain::foundation::Identity;
use crate::domain::notification::Notification;
use crate::ports::{
    DurableWrite, LocalStore, PersistenceError, PersistenceTier, ReadQuery, ReadResult,
    RemoteStore, TierKind, WriteReceipt,
};

/// Description shown when a write fell back to the device.
pub const SAVED_LOCALLY: &str = "Saved on this device; it will sync once the server is reachable";

/// One tier that was attempted and failed.
#[derive(Debug, Clone, PartialEq)]
pub struct TierFailure {
    pub tier: TierKind,
    pub error: PersistenceError,
}

/// What happened when a chain ran.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome<T> {
    /// The tier that finally handled the call.
    pub tier: TierKind,
    /// The value from a durable tier. Always `None` when the no-op tier
    /// handled the call.
    pub value: Option<T>,
    pub failures: Vec<TierFailure>,
}

impl<T> ChainOutcome<T> {
    /// True when a remote or local tier took the call.
    pub fn is_durable(&self) -> bool {
        self.tier != TierKind::NoOp
    }

    /// True when at least one tier failed along the way.
    pub fn degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn first_failure(&self) -> Option<&TierFailure> {
        self.failures.first()
    }

    /// The notification for this outcome.
    ///
    /// | Outcome | Notification |
    /// |---------|--------------|
    /// | remote, or local without failures | `success` |
    /// | local after a failure | warning |
    /// | no-op after a failure | error |
    /// | no-op without failures | none |
    pub fn notification(&self, success: Notification, failure_title: &str) -> Option<Notification> {
        match (self.tier, self.degraded()) {
            (TierKind::NoOp, false) => None,
            (TierKind::Remote, _) | (TierKind::Local, false) => Some(success),
            _ => self.failure_notification(failure_title),
        }
    }

    /// Like [`ChainOutcome::notification`], but a silent no-op still shows
    /// `success`, since the in-memory change is all the user asked for.
    pub fn notification_or(&self, success: Notification, failure_title: &str) -> Notification {
        self.failure_notification(failure_title).unwrap_or(success)
    }

    /// Only the warning or error half of [`ChainOutcome::notification`].
    pub fn failure_notification(&self, failure_title: &str) -> Option<Notification> {
        if !self.degraded() {
            return None;
        }
        match self.tier {
            TierKind::Local => Some(Notification::warning(failure_title).with_description(SAVED_LOCALLY)),
            TierKind::NoOp => {
                let description = self
                    .first_failure()
                    .map(|f| f.error.to_string())
                    .unwrap_or_default();
                Some(Notification::error(failure_title).with_description(description))
            }
            TierKind::Remote => None,
        }
    }

    /// Collapses the outcome for readers: a durable value, the first error
    /// when every tier failed, or nothing.
    pub fn into_result(self) -> Result<Option<T>, PersistenceError> {
        if self.value.is_some() {
            return Ok(self.value);
        }
        match self.failures.into_iter().next() {
            Some(failure) if self.tier == TierKind::NoOp => Err(failure.error),
            _ => Ok(None),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ChainOutcome<U> {
        ChainOutcome {
            tier: self.tier,
            value: self.value.map(f),
            failures: self.failures,
        }
    }
}

/// Ordered persistence tiers ending in [`NoOpTier`].
#[derive(Clone)]
pub struct TierChain {
    tiers: Vec<Arc<dyn PersistenceTier>>,
}

impl TierChain {
    /// Builds a chain from `tiers`, appending the no-op tier when missing.
    pub fn new(mut tiers: Vec<Arc<dyn PersistenceTier>>) -> Self {
        if tiers.last().map(|t| t.kind()) != Some(TierKind::NoOp) {
            tiers.push(Arc::new(NoOpTier));
        }
        Self { tiers }
    }

    pub fn builder() -> TierChainBuilder {
        TierChainBuilder::default()
    }

    /// A chain with nothing but the no-op tier.
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    pub fn tier_kinds(&self) -> Vec<TierKind> {
        self.tiers.iter().map(|t| t.kind()).collect()
    }

    pub async fn write(&self, identity: &Identity, write: &DurableWrite) -> ChainOutcome<WriteReceipt> {
        let outcome = self
            .run(identity, write.label(), |tier| async move {
                tier.write(identity, write).await
            })
            .await;
        tracing::debug!(write = write.label(), tier = %outcome.tier, failures = outcome.failures.len(), "durable write finished");
        outcome
    }

    pub async fn read(&self, identity: &Identity, query: &ReadQuery) -> ChainOutcome<ReadResult> {
        self.run(identity, query.label(), |tier| async move {
            tier.read(identity, query).await
        })
        .await
    }

    async fn run<T, F, Fut>(&self, identity: &Identity, operation: &str, attempt: F) -> ChainOutcome<T>
    where
        F: Fn(Arc<dyn PersistenceTier>) -> Fut,
        Fut: Future<Output = Result<T, PersistenceError>>,
    {
        let mut failures = Vec::new();

        for tier in &self.tiers {
            let kind = tier.kind();
            if !tier.is_available(identity) {
                continue;
            }
            match attempt(Arc::clone(tier)).await {
                Ok(value) => {
                    let value = (kind != TierKind::NoOp).then_some(value);
                    return ChainOutcome {
                        tier: kind,
                        value,
                        failures,
                    };
                }
                Err(PersistenceError::Unsupported(_)) => {
                    tracing::trace!(tier = %kind, operation, "tier does not serve operation");
                }
                Err(error) => {
                    tracing::warn!(tier = %kind, operation, error = %error, "persistence tier failed");
                    failures.push(TierFailure { tier: kind, error });
                }
            }
        }

        ChainOutcome {
            tier: TierKind::NoOp,
            value: None,
            failures,
        }
    }
}

#[derive(Default)]
pub struct TierChainBuilder {
    tiers: Vec<Arc<dyn PersistenceTier>>,
}

impl TierChainBuilder {
    pub fn remote(mut self, store: Arc<dyn RemoteStore>) -> Self {
        self.tiers.push(Arc::new(RemoteTier::new(store)));
        self
    }

    pub fn local(mut self, store: Arc<dyn LocalStore>, key_prefix: impl Into<String>) -> Self {
        self.tiers.push(Arc::new(LocalTier::new(store, key_prefix)));
        self
    }

    pub fn tier(mut self, tier: Arc<dyn PersistenceTier>) -> Self {
        self.tiers.push(tier);
        self
    }

    pub fn build(self) -> TierChain {
        TierChain::new(self.tiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::InMemoryLocalStore;
    use crate::adapters::remote::{InMemoryRemoteStore, RemoteOperation};
    use crate::domain::conversation::{ConversationFilter, Rating};
    use crate::domain::foundation::{InsightId, MessageId, UserId};
    use crate::domain::notification::NotificationLevel;

    fn known() -> Identity {
        Identity::known(UserId::new("user-1").unwrap())
    }

    fn dismiss(id: &str) -> DurableWrite {
        DurableWrite::DismissInsight {
            insight_id: InsightId::new(id).unwrap(),
        }
    }

    struct Fixture {
        remote: Arc<InMemoryRemoteStore>,
        local: Arc<InMemoryLocalStore>,
        chain: TierChain,
    }

    fn fixture() -> Fixture {
        let remote = Arc::new(InMemoryRemoteStore::new());
        let local = Arc::new(InMemoryLocalStore::new());
        let chain = TierChain::builder()
            .remote(remote.clone())
            .local(local.clone(), "assistant")
            .build();
        Fixture { remote, local, chain }
    }

    mod construction {
        use super::*;

        #[test]
        fn always_ends_with_noop() {
            assert_eq!(TierChain::silent().tier_kinds(), vec![TierKind::NoOp]);
            assert_eq!(
                fixture().chain.tier_kinds(),
                vec![TierKind::Remote, TierKind::Local, TierKind::NoOp]
            );
        }

        #[test]
        fn does_not_duplicate_noop() {
            let chain = TierChain::new(vec![Arc::new(NoOpTier)]);
            assert_eq!(chain.tier_kinds(), vec![TierKind::NoOp]);
        }
    }

    mod writes {
        use super::*;

        #[tokio::test]
        async fn remote_success_skips_local() {
            let f = fixture();
            let outcome = f.chain.write(&known(), &dismiss("3")).await;

            assert_eq!(outcome.tier, TierKind::Remote);
            assert!(outcome.is_durable());
            assert!(!outcome.degraded());
            assert!(f.local.keys().await.is_empty());
        }

        #[tokio::test]
        async fn remote_failure_falls_back_to_local() {
            let f = fixture();
            f.remote.fail(RemoteOperation::DismissInsight).await;

            let outcome = f.chain.write(&known(), &dismiss("3")).await;

            assert_eq!(outcome.tier, TierKind::Local);
            assert!(outcome.degraded());
            assert_eq!(f.local.list("assistant.dismissed_insights").await.len(), 1);

            let note = outcome
                .notification(Notification::success("Insight dismissed"), "Could not sync dismissal")
                .unwrap();
            assert_eq!(note.level, NotificationLevel::Warning);
        }

        #[tokio::test]
        async fn every_tier_failing_ends_in_noop_with_error() {
            let f = fixture();
            f.remote.fail_all().await;
            f.local.set_failing(true);

            let outcome = f.chain.write(&known(), &dismiss("3")).await;

            assert_eq!(outcome.tier, TierKind::NoOp);
            assert_eq!(outcome.failures.len(), 2);
            assert!(outcome.value.is_none());
            let note = outcome.failure_notification("Failed to dismiss insight").unwrap();
            assert_eq!(note.level, NotificationLevel::Error);
        }

        #[tokio::test]
        async fn anonymous_without_local_is_silent() {
            let remote = Arc::new(InMemoryRemoteStore::new());
            let chain = TierChain::builder().remote(remote.clone()).build();

            let outcome = chain
                .write(
                    &Identity::Anonymous,
                    &DurableWrite::RateMessage {
                        message_id: MessageId::new(),
                        rating: Rating::Up,
                    },
                )
                .await;

            assert_eq!(outcome.tier, TierKind::NoOp);
            assert!(!outcome.degraded());
            assert!(outcome
                .notification(Notification::success("Saved"), "Failed")
                .is_none());
            assert_eq!(remote.call_count(), 0);
        }
    }

    mod reads {
        use super::*;

        #[tokio::test]
        async fn unsupported_local_read_is_not_a_failure() {
            let chain = TierChain::builder()
                .local(Arc::new(InMemoryLocalStore::new()), "assistant")
                .build();
            let outcome = chain.read(&known(), &ReadQuery::ProjectAnalyses).await;
            assert_eq!(outcome.tier, TierKind::NoOp);
            assert!(!outcome.degraded());
            assert_eq!(outcome.into_result(), Ok(None));
        }

        #[tokio::test]
        async fn failed_read_surfaces_first_error() {
            let f = fixture();
            f.remote.fail(RemoteOperation::GetInsights).await;
            let outcome = f
                .chain
                .read(
                    &known(),
                    &ReadQuery::Insights(crate::domain::insight::InsightFilter::active()),
                )
                .await;
            assert!(matches!(outcome.into_result(), Err(PersistenceError::Remote(_))));
        }

        #[tokio::test]
        async fn conversations_fall_back_to_local_list() {
            let f = fixture();
            f.remote.fail(RemoteOperation::GetConversations).await;
            let outcome = f
                .chain
                .read(&known(), &ReadQuery::Conversations(ConversationFilter::active()))
                .await;
            assert_eq!(outcome.tier, TierKind::Local);
            let conversations = outcome.into_result().unwrap().unwrap().into_conversations();
            assert_eq!(conversations, Some(vec![]));
        }
    }
}
