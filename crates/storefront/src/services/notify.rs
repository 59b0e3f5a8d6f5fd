//! Notification sinks.
//!
//! The storefront surfaces failed cart operations as short user-facing
//! messages. [`TracingNotifier`] writes them to the log and leaves a Sentry
//! breadcrumb; [`RecordingNotifier`] keeps them in memory so they can be
//! read back.

use std::sync::{Mutex, PoisonError};

use rocketshoes_core::{Notification, Notifier};

use crate::error::add_breadcrumb;

/// Logs notifications and records them as Sentry breadcrumbs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::warn!(
            operation = ?notification.operation,
            kind = ?notification.kind,
            message = notification.message,
            "Cart notification"
        );

        let operation = format!("{:?}", notification.operation);
        add_breadcrumb(
            "cart",
            notification.message,
            Some(&[("operation", operation.as_str())]),
        );
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications recorded so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages of all notifications recorded so far.
    #[must_use]
    pub fn messages(&self) -> Vec<&'static str> {
        self.notifications().iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
