//! Notifier Port - surfaces outcomes to the user.

use crate::domain::notification::Notification;

/// Delivers user-visible notifications.
///
/// Synchronous and infallible: a toast that cannot be shown is dropped.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
