//! Strongly typed Rollbook configuration.
//!
//! Every section has serde defaults, so an empty file or no file at all
//! produces a working configuration.

use chrono::format::{Item, StrftimeItems};
use rollbook_common::SortOrder;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollbookConfig {
    pub display: DisplayConfig,
    pub messages: MessageTemplates,
    pub table: TableConfig,
    pub api: ApiConfig,
}

impl RollbookConfig {
    /// Reject values no component can work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.table.page_size == 0 {
            return Err(ConfigError::invalid_value(
                "table.page_size",
                "must be greater than zero",
            ));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::invalid_value("api.base_url", "must not be empty"));
        }
        if self.display.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::invalid_value(
                "display.utc_offset_minutes",
                "must be less than one day",
            ));
        }
        for (key, pattern) in self.display.patterns() {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(ConfigError::invalid_value(
                    key,
                    format!("'{pattern}' is not a valid strftime pattern"),
                ));
            }
        }
        Ok(())
    }
}

/// Timestamp patterns (chrono `strftime` syntax) for each time field kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub time_full: String,
    pub time_date: String,
    pub time_hour: String,
    pub time_month: String,
    /// Offset applied to timestamps that carry a zone before formatting.
    pub utc_offset_minutes: i32,
}

impl DisplayConfig {
    fn patterns(&self) -> [(&'static str, &str); 4] {
        [
            ("display.time_full", &self.time_full),
            ("display.time_date", &self.time_date),
            ("display.time_hour", &self.time_hour),
            ("display.time_month", &self.time_month),
        ]
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_full: "%d/%m/%Y %H:%M:%S".into(),
            time_date: "%d/%m/%Y".into(),
            time_hour: "%H:%M:%S".into(),
            time_month: "%m".into(),
            utc_offset_minutes: 0,
        }
    }
}

/// Validation message templates.
///
/// `{label}` is replaced by the field label, `{limit}` by the bound of a
/// min/max rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplates {
    pub required: String,
    pub not_a_number: String,
    pub not_a_string: String,
    pub not_a_boolean: String,
    pub too_small: String,
    pub too_large: String,
    pub too_short: String,
    pub too_long: String,
    pub pattern: String,
    pub email: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            required: "{label} is required".into(),
            not_a_number: "{label} must be a number".into(),
            not_a_string: "{label} must be a string".into(),
            not_a_boolean: "{label} must be true or false".into(),
            too_small: "{label} must be greater than or equal to {limit}".into(),
            too_large: "{label} must be less than or equal to {limit}".into(),
            too_short: "{label} must be at least {limit} characters long".into(),
            too_long: "{label} must be at most {limit} characters long".into(),
            pattern: "{label} has an invalid format".into(),
            email: "{label} must be a valid email".into(),
        }
    }
}

impl MessageTemplates {
    /// Fill a template's placeholders.
    pub fn render(template: &str, label: &str, limit: Option<&str>) -> String {
        let out = template.replace("{label}", label);
        match limit {
            Some(limit) => out.replace("{limit}", limit),
            None => out,
        }
    }
}

/// Table defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub page_size: usize,
    pub default_sort_order: SortOrder,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            default_sort_order: SortOrder::Desc,
        }
    }
}

/// REST collaborator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".into(),
            timeout_secs: 30,
        }
    }
}
