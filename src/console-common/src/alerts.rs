//! User-facing alerts.
//!
//! Console components never raise errors for recoverable user mistakes.
//! They dispatch an [`Alert`] to whatever [`AlertSink`] the host injected
//! and leave their state untouched.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Success => write!(f, "success"),
            AlertLevel::Info => write!(f, "info"),
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Error => write!(f, "error"),
        }
    }
}

/// A transient notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Severity.
    pub level: AlertLevel,
    /// Short headline.
    pub message: String,
    /// Longer explanation.
    pub description: String,
}

impl Alert {
    pub fn new(
        level: AlertLevel,
        message: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            description: description.into(),
        }
    }

    pub fn warning(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(AlertLevel::Warning, message, description)
    }

    pub fn error(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(AlertLevel::Error, message, description)
    }

    pub fn info(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(AlertLevel::Info, message, description)
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.message, self.description)
    }
}

/// Receiver of user-facing alerts.
pub trait AlertSink: Send + Sync {
    fn dispatch(&self, alert: Alert);
}

impl<T: AlertSink + ?Sized> AlertSink for Arc<T> {
    fn dispatch(&self, alert: Alert) {
        (**self).dispatch(alert)
    }
}

/// Sink that mirrors alerts into the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn dispatch(&self, alert: Alert) {
        match alert.level {
            AlertLevel::Error => {
                tracing::error!(message = %alert.message, description = %alert.description, "alert")
            }
            AlertLevel::Warning => {
                tracing::warn!(message = %alert.message, description = %alert.description, "alert")
            }
            AlertLevel::Success | AlertLevel::Info => {
                tracing::info!(message = %alert.message, description = %alert.description, "alert")
            }
        }
    }
}

/// Sink that keeps every alert it receives, in order.
///
/// Used by the CLI to report alerts after a run and by tests.
#[derive(Debug, Default)]
pub struct RecordingAlertSink {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded alerts.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    /// Remove and return all recorded alerts.
    pub fn drain(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.alerts.lock())
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.lock().is_empty()
    }
}

impl AlertSink for RecordingAlertSink {
    fn dispatch(&self, alert: Alert) {
        tracing::debug!(level = %alert.level, message = %alert.message, "recording alert");
        self.alerts.lock().push(alert);
    }
}
