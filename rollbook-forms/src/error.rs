//! Error types for form operations

use thiserror::Error;

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Misuse of a form engine by page code.
///
/// Validation failures and collaborator failures are not errors here; they are
/// reported through [`crate::SubmitOutcome`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// No input with this name
    #[error("form field not found: {name}")]
    FieldNotFound { name: String },

    /// The input has neither an option source nor static options
    #[error("form field '{name}' has no options to load")]
    NoOptionSource { name: String },
}

impl FormError {
    pub fn field_not_found(name: impl Into<String>) -> Self {
        Self::FieldNotFound { name: name.into() }
    }

    pub fn no_option_source(name: impl Into<String>) -> Self {
        Self::NoOptionSource { name: name.into() }
    }
}
