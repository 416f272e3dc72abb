//! Insight lifecycle: refresh, dismiss, implement and reminders.
//!
//! Every mutation is applied to the in-memory set first. Persistence runs
//! afterwards through the tier chain and only decides which notification
//! the user sees, unless the reconciliation policy asks for a revert.

use std::sync::Arc;

use crate::application::persistence::{ChainOutcome, DataSource, TierChain};
use crate::application::ReconciliationPolicy;
use crate::domain::export::{insights_report, INSIGHTS_REPORT_FILE};
use crate::domain::foundation::{Identity, InsightId, Timestamp, ValidationError};
use crate::domain::insight::{
    Insight, InsightCategory, InsightFilter, InsightSet, InsightState, Reminder, GROWTH_HUB_ACTION,
    GROWTH_HUB_ROUTE,
};
use crate::domain::notification::Notification;
use crate::ports::{DurableWrite, Notifier, PersistenceError, WriteReceipt};

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Replaced { count: usize, high_priority: usize },
    /// The source returned nothing; the set is now empty.
    UpToDate,
    /// The fetch failed; the set is untouched.
    Failed(PersistenceError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DismissOutcome {
    /// The id was not in the active set. Nothing was persisted.
    AlreadyAbsent,
    Dismissed {
        persistence: ChainOutcome<WriteReceipt>,
        reverted: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImplementOutcome {
    /// Reserved action: navigate instead of recording anything.
    Navigate { route: &'static str },
    Recorded {
        persistence: ChainOutcome<WriteReceipt>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightReport {
    pub file_name: &'static str,
    pub contents: String,
}

pub struct InsightLifecycleManager {
    chain: TierChain,
    notifier: Arc<dyn Notifier>,
    policy: ReconciliationPolicy,
    insights: InsightSet,
}

impl InsightLifecycleManager {
    pub fn new(chain: TierChain, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            chain,
            notifier,
            policy: ReconciliationPolicy::default(),
            insights: InsightSet::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReconciliationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Installs a set fetched elsewhere, e.g. during the initial load.
    pub fn replace_all(&mut self, insights: Vec<Insight>) {
        self.insights.replace_all(insights);
    }

    /// Re-fetches active insights and supersedes the current set, keeping
    /// the source's order.
    pub async fn refresh(&mut self, source: &DataSource) -> RefreshOutcome {
        let fetched = match source.insights(&self.chain, &InsightFilter::active()).await {
            Ok(fetched) => fetched,
            Err(error) => {
                tracing::warn!(error = %error, "insight refresh failed");
                self.notifier.notify(
                    Notification::error("Failed to refresh insights").with_description(error.to_string()),
                );
                return RefreshOutcome::Failed(error);
            }
        };

        self.insights.replace_all(fetched);
        if self.insights.is_empty() {
            self.notifier.notify(
                Notification::info("No new insights").with_description("All data is up to date"),
            );
            return RefreshOutcome::UpToDate;
        }

        let count = self.insights.len();
        let high_priority = self.insights.high_priority_count();
        tracing::info!(count, high_priority, "insights refreshed");
        self.notifier.notify(
            Notification::success("Insights refreshed").with_description(format!(
                "Found {} insights ({} high priority)",
                count, high_priority
            )),
        );
        RefreshOutcome::Replaced {
            count,
            high_priority,
        }
    }

    /// Removes an insight from the active set, then persists the dismissal.
    ///
    /// Dismissing an id that is not active is a no-op.
    pub async fn dismiss(&mut self, identity: &Identity, id: &InsightId) -> DismissOutcome {
        let Some((index, insight)) = self.insights.dismiss(id) else {
            return DismissOutcome::AlreadyAbsent;
        };

        let persistence = self
            .chain
            .write(
                identity,
                &DurableWrite::DismissInsight {
                    insight_id: id.clone(),
                },
            )
            .await;

        let reverted = self
            .policy
            .reverts(persistence.is_durable(), persistence.degraded());
        if reverted {
            tracing::info!(insight_id = %id, index, "dismissal reverted");
            self.insights.restore(index, insight);
        }

        self.notifier.notify(persistence.notification_or(
            Notification::success("Insight dismissed"),
            "Failed to dismiss insight",
        ));
        DismissOutcome::Dismissed {
            persistence,
            reverted,
        }
    }

    /// Acts on an insight. The reserved growth-hub action only navigates;
    /// anything else marks the insight implemented and records it.
    pub async fn implement(
        &mut self,
        identity: &Identity,
        id: &InsightId,
        action: &str,
    ) -> Result<ImplementOutcome, ValidationError> {
        if self.insights.get(id).is_none() {
            return Err(ValidationError::InsightNotFound(id.clone()));
        }
        if action == GROWTH_HUB_ACTION {
            return Ok(ImplementOutcome::Navigate {
                route: GROWTH_HUB_ROUTE,
            });
        }

        self.insights.mark_implemented(id);
        let persistence = self
            .chain
            .write(
                identity,
                &DurableWrite::ImplementInsight {
                    insight_id: id.clone(),
                    action: action.to_string(),
                },
            )
            .await;

        self.notifier.notify(persistence.notification_or(
            Notification::success("Action started").with_description(action),
            "Failed to record action",
        ));
        Ok(ImplementOutcome::Recorded { persistence })
    }

    /// Records a reminder due 24 hours from now.
    pub async fn schedule_reminder(
        &self,
        identity: &Identity,
        action: &str,
    ) -> ChainOutcome<WriteReceipt> {
        let reminder = Reminder::tomorrow(action, Timestamp::now());
        let persistence = self
            .chain
            .write(identity, &DurableWrite::ScheduleReminder { reminder })
            .await;

        self.notifier.notify(persistence.notification_or(
            Notification::success("Reminder set")
                .with_description(format!("You'll be reminded about \"{}\" tomorrow", action)),
            "Failed to save reminder",
        ));
        persistence
    }

    /// Renders the active insights as a markdown report.
    pub fn export_report(&self) -> InsightReport {
        let contents = insights_report(self.insights.active());
        self.notifier.notify(
            Notification::success("Report exported")
                .with_description(format!("{} insights", self.insights.len())),
        );
        InsightReport {
            file_name: INSIGHTS_REPORT_FILE,
            contents,
        }
    }

    pub fn active(&self) -> &[Insight] {
        self.insights.active()
    }

    pub fn get(&self, id: &InsightId) -> Option<&Insight> {
        self.insights.get(id)
    }

    pub fn high_priority_count(&self) -> usize {
        self.insights.high_priority_count()
    }

    pub fn categories(&self) -> Vec<&InsightCategory> {
        self.insights.categories()
    }

    pub fn lifecycle(&self, id: &InsightId) -> Option<InsightState> {
        self.insights.lifecycle(id)
    }
}
