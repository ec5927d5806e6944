//! Error types shared across Rollbook crates
//!
//! Every collaborator call (query, submit, option lookup, enrichment, CTA
//! action) fails with an [`ApiError`]. Crates with their own failure modes
//! define their own `thiserror` enums and classify them with [`Severity`].

use std::fmt;

use thiserror::Error;

/// Severity levels for error classification
///
/// Severity decides how loudly a failure is logged and which notification
/// level it surfaces as. No severity in this layer is fatal to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Potential issue, the operation could still be retried by the user.
    ///
    /// # Examples
    /// - A request rejected by the server as invalid (4xx)
    Warning,

    /// The operation failed but the page keeps working.
    ///
    /// # Examples
    /// - Server errors (5xx)
    /// - Transport failures with no HTTP status
    Error,

    /// The page cannot continue without user intervention.
    ///
    /// # Examples
    /// - The session is no longer authorised (401)
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Trait for error types that have severity levels
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

/// Failure reported by a data-access collaborator.
///
/// `status` is the HTTP status when the failure came from a response, and
/// `None` for transport failures or in-process collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status code, if any
    pub status: Option<u16>,
    /// Human readable message, shown to the user as a notification
    pub message: String,
}

impl ApiError {
    /// Create an error with no status.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Create an error carrying an HTTP status.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// True when the server rejected the request as unauthorised.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

impl Severity for ApiError {
    fn severity(&self) -> ErrorSeverity {
        match self.status {
            Some(401) | Some(403) => ErrorSeverity::Critical,
            Some(s) if (400..500).contains(&s) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }
}
