//! Error types for overlay operations

use thiserror::Error;

/// Result type for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverlayError {
    /// Content was requested while the overlay is closed
    #[error("overlay '{title}' is not open")]
    NotOpen { title: String },

    /// `confirm` was called with no confirmation pending
    #[error("'{label}' has no pending confirmation")]
    NothingToConfirm { label: String },
}

impl OverlayError {
    pub fn not_open(title: impl Into<String>) -> Self {
        Self::NotOpen {
            title: title.into(),
        }
    }

    pub fn nothing_to_confirm(label: impl Into<String>) -> Self {
        Self::NothingToConfirm {
            label: label.into(),
        }
    }
}
