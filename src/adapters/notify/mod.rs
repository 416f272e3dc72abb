//! Notifier adapters.
//!
//! - `TracingNotifier` logs each notification at a matching level
//! - `RecordingNotifier` keeps notifications for assertions
//! - `NoOpNotifier` drops everything

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::notification::{Notification, NotificationLevel};
use crate::ports::Notifier;

/// Writes notifications to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let description = notification.description.as_deref().unwrap_or("");
        match notification.level {
            NotificationLevel::Info | NotificationLevel::Success => tracing::info!(
                level = %notification.level,
                title = %notification.title,
                description,
                "notification"
            ),
            NotificationLevel::Warning => tracing::warn!(
                title = %notification.title,
                description,
                "notification"
            ),
            NotificationLevel::Error => tracing::error!(
                title = %notification.title,
                description,
                "notification"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Keeps every notification in arrival order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.notifications.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inner().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.inner().last().cloned()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.inner().iter().filter(|n| n.level == level).count()
    }

    pub fn has_failures(&self) -> bool {
        self.inner().iter().any(Notification::is_failure)
    }

    /// Drains and returns everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.inner())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.inner().push(notification);
    }
}
