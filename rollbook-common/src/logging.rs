//! Logging utilities for Rollbook
//!
//! This module provides utilities for formatting and displaying log messages.

use serde::Serialize;
use std::fmt::Debug;

/// Wrapper for pretty-printing types in logs as YAML
///
/// Used when logging submitted form values and query parameters:
///
/// ```ignore
/// use rollbook_common::Pretty;
/// use tracing::debug;
///
/// debug!("submitting {}", Pretty(&values));
/// ```
///
/// Outputs YAML with a leading newline. Debug is the fallback if YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_renders_yaml_with_leading_newline() {
        let values = json!({"classGroupName": "7A", "grade": 7});
        let out = Pretty(&values).to_string();
        assert!(out.starts_with('\n'));
        assert!(out.contains("classGroupName: 7A"));
        assert!(out.contains("grade: 7"));
    }
}
