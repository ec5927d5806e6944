//! The option shape returned by enum and lookup endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::loose_eq;

/// A single selectable or displayable option.
///
/// Select inputs list these, badge cells resolve raw ids to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumOption {
    pub id: Value,
    pub label: String,
    #[serde(default)]
    pub name: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl EnumOption {
    /// An option whose id and value are the same and whose name is its label.
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        let value = value.into();
        let label = label.into();
        Self {
            id: value.clone(),
            name: label.clone(),
            label,
            value,
            slug: None,
            color: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// True if `raw` is this option's value or id.
    pub fn matches(&self, raw: &Value) -> bool {
        loose_eq(&self.value, raw) || loose_eq(&self.id, raw)
    }

    /// Case-insensitive search over name and label.
    pub fn matches_search(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        needle.is_empty()
            || self.name.to_lowercase().contains(&needle)
            || self.label.to_lowercase().contains(&needle)
    }
}
