//! User-facing notifications.
//!
//! The store and the orchestrator never let a recoverable failure escape as
//! an error. They report it here instead, as a short titled message, and
//! carry on.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Something happened as requested.
    Info,
    /// Something failed and the user should know.
    Destructive,
}

/// A message meant for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: Level,
    /// Short headline.
    pub title: String,
    /// One-sentence detail.
    pub description: String,
}

impl Notification {
    /// Create an informational notification.
    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Create a notification reporting a failure.
    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Check if this notification reports a failure.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.level == Level::Destructive
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.title, self.description)
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Deliver a notification.
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Info => info!(title = %notification.title, "{}", notification.description),
            Level::Destructive => {
                warn!(title = %notification.title, "{}", notification.description);
            }
        }
    }
}

/// Keeps every notification it receives.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of everything received so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return everything received so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.received.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Get the titles received so far, in order.
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.title).collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
