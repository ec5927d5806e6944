//! Error types for table operations

use rollbook_common::{ApiError, ErrorSeverity, Severity};
use thiserror::Error;

use crate::cache::SourceKey;

/// Result type for table operations
pub type Result<T> = std::result::Result<T, TableError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    /// The query collaborator failed; the cached rows are left as they were.
    #[error("query for '{key}' failed: {source}")]
    Query {
        key: SourceKey,
        #[source]
        source: ApiError,
    },

    #[error("table has no filter named '{name}'")]
    UnknownFilter { name: String },
}

impl TableError {
    pub fn query(key: SourceKey, source: ApiError) -> Self {
        Self::Query { key, source }
    }

    pub fn unknown_filter(name: impl Into<String>) -> Self {
        Self::UnknownFilter { name: name.into() }
    }

    /// The underlying API error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Query { source, .. } => Some(source),
            Self::UnknownFilter { .. } => None,
        }
    }
}

impl Severity for TableError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Query { source, .. } => source.severity(),
            Self::UnknownFilter { .. } => ErrorSeverity::Error,
        }
    }
}
