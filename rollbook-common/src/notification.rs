//! Typed user notifications.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorSeverity, Severity};

/// How a notification is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient message for the user, produced by page-level outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Build a notification from an error, using its message and severity.
    ///
    /// Warnings stay warnings; anything worse is shown as an error.
    pub fn from_error<E: fmt::Display + Severity>(err: &E) -> Self {
        let level = match err.severity() {
            ErrorSeverity::Warning => NotificationLevel::Warning,
            ErrorSeverity::Error | ErrorSeverity::Critical => NotificationLevel::Error,
        };
        Self {
            level,
            message: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.level, self.message)
    }
}
