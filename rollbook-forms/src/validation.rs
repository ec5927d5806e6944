//! Per-field validation rules.
//!
//! Rules follow the usual schema-validator conventions: a value that is null,
//! missing, a blank string or an empty array counts as absent. An absent value
//! fails only when the rule is `required`; every other check is skipped for it.
//! Numbers and booleans accept their string forms, as submitted by text inputs.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use rollbook_config::MessageTemplates;
use serde_json::{Map, Value};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex")
});

/// Field errors keyed by input name, in schema order.
pub type FieldErrors = IndexMap<String, String>;

/// The type a rule expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Any,
    String,
    Number,
    Boolean,
    Array,
}

/// Validation rule for one field.
#[derive(Debug, Clone)]
pub struct Rule {
    value_type: ValueType,
    required: bool,
    label: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
    min_len: Option<usize>,
    max_len: Option<usize>,
    pattern: Option<Regex>,
    email: bool,
}

impl Rule {
    fn of(value_type: ValueType) -> Self {
        Self {
            value_type,
            required: false,
            label: None,
            min: None,
            max: None,
            min_len: None,
            max_len: None,
            pattern: None,
            email: false,
        }
    }

    pub fn any() -> Self {
        Self::of(ValueType::Any)
    }

    pub fn string() -> Self {
        Self::of(ValueType::String)
    }

    pub fn number() -> Self {
        Self::of(ValueType::Number)
    }

    pub fn boolean() -> Self {
        Self::of(ValueType::Boolean)
    }

    pub fn array() -> Self {
        Self::of(ValueType::Array)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Label used in messages instead of the input's label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Minimum characters for strings, elements for arrays.
    pub fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn email(mut self) -> Self {
        self.email = true;
        self
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Check one value, returning the rendered message of the first failure.
    pub fn check(
        &self,
        value: Option<&Value>,
        label: &str,
        messages: &MessageTemplates,
    ) -> Result<(), String> {
        let label = self.label.as_deref().unwrap_or(label);
        let fail = |template: &str, limit: Option<String>| {
            Err(MessageTemplates::render(template, label, limit.as_deref()))
        };

        let value = match value {
            Some(v) if !is_absent(v) => v,
            _ if self.required => return fail(&messages.required, None),
            _ => return Ok(()),
        };

        match self.value_type {
            ValueType::Any => Ok(()),
            ValueType::Number => {
                let Some(n) = as_number(value) else {
                    return fail(&messages.not_a_number, None);
                };
                if let Some(min) = self.min.filter(|min| n < *min) {
                    return fail(&messages.too_small, Some(format_limit(min)));
                }
                if let Some(max) = self.max.filter(|max| n > *max) {
                    return fail(&messages.too_large, Some(format_limit(max)));
                }
                Ok(())
            }
            ValueType::Boolean => match value {
                Value::Bool(_) => Ok(()),
                Value::String(s) if matches!(s.as_str(), "true" | "false") => Ok(()),
                _ => fail(&messages.not_a_boolean, None),
            },
            ValueType::String => {
                let Value::String(s) = value else {
                    return fail(&messages.not_a_string, None);
                };
                self.check_len(s.chars().count(), messages, &fail)?;
                if self.pattern.as_ref().is_some_and(|re| !re.is_match(s)) {
                    return fail(&messages.pattern, None);
                }
                if self.email && !EMAIL_REGEX.is_match(s) {
                    return fail(&messages.email, None);
                }
                Ok(())
            }
            ValueType::Array => match value {
                Value::Array(items) => self.check_len(items.len(), messages, &fail),
                _ => fail(&messages.pattern, None),
            },
        }
    }

    fn check_len(
        &self,
        len: usize,
        messages: &MessageTemplates,
        fail: &dyn Fn(&str, Option<String>) -> Result<(), String>,
    ) -> Result<(), String> {
        if let Some(min) = self.min_len.filter(|min| len < *min) {
            return fail(&messages.too_short, Some(min.to_string()));
        }
        if let Some(max) = self.max_len.filter(|max| len > *max) {
            return fail(&messages.too_long, Some(max.to_string()));
        }
        Ok(())
    }
}

/// Rules by field name. Fields without a rule always pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    rules: IndexMap<String, Rule>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate a value set. `label_of` supplies the display label for a name.
    pub fn validate<L>(
        &self,
        values: &Map<String, Value>,
        label_of: L,
        messages: &MessageTemplates,
    ) -> FieldErrors
    where
        L: Fn(&str) -> String,
    {
        self.rules
            .iter()
            .filter_map(|(name, rule)| {
                rule.check(values.get(name), &label_of(name), messages)
                    .err()
                    .map(|message| (name.clone(), message))
            })
            .collect()
    }

    /// Validate a single field.
    pub fn validate_field(
        &self,
        name: &str,
        value: Option<&Value>,
        label: &str,
        messages: &MessageTemplates,
    ) -> Option<String> {
        self.rules
            .get(name)
            .and_then(|rule| rule.check(value, label, messages).err())
    }
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn format_limit(limit: f64) -> String {
    if limit.fract() == 0.0 && limit.abs() < i64::MAX as f64 {
        (limit as i64).to_string()
    } else {
        limit.to_string()
    }
}
