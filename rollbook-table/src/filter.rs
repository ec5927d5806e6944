//! Filter conditions and query parameters.

use std::cmp::Ordering;

use rollbook_common::{display_raw, loose_eq, value_at, Record, SortOrder};
use rollbook_forms::FormFieldDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a filter value is compared with a record's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Equal,
    NotEqual,
    /// Case-insensitive substring
    Like,
    GreaterThan,
    LessThan,
    /// The record value is one of the filter's values
    In,
}

impl Comparator {
    /// Operator token in `field||op||value` filter parameters.
    pub fn as_param(&self) -> &'static str {
        match self {
            Comparator::Equal => "$eq",
            Comparator::NotEqual => "$ne",
            Comparator::Like => "$cont",
            Comparator::GreaterThan => "$gt",
            Comparator::LessThan => "$lt",
            Comparator::In => "$in",
        }
    }

    /// Does `actual` (from a record) satisfy this comparator against `expected`?
    pub fn matches(&self, actual: &Value, expected: &Value) -> bool {
        match self {
            Comparator::Equal => loose_eq(actual, expected),
            Comparator::NotEqual => !loose_eq(actual, expected),
            Comparator::Like => display_raw(actual)
                .to_lowercase()
                .contains(&display_raw(expected).to_lowercase()),
            Comparator::GreaterThan => compare_values(actual, expected) == Ordering::Greater,
            Comparator::LessThan => compare_values(actual, expected) == Ordering::Less,
            Comparator::In => match expected {
                Value::Array(items) => items.iter().any(|item| loose_eq(actual, item)),
                single => loose_eq(actual, single),
            },
        }
    }
}

/// Order two values: numerically when both are numbers (or numeric strings),
/// otherwise by their raw text. Null sorts first.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => display_raw(a).cmp(&display_raw(b)),
        },
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// One condition passed to the query collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub comparator: Comparator,
    pub value: Value,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, comparator: Comparator, value: Value) -> Self {
        Self {
            field: field.into(),
            comparator,
            value,
        }
    }

    /// Encode as `field||op||value`; list values are comma separated.
    pub fn to_param(&self) -> String {
        let value = match &self.value {
            Value::Array(items) => items.iter().map(display_raw).collect::<Vec<_>>().join(","),
            other => display_raw(other),
        };
        format!("{}||{}||{}", self.field, self.comparator.as_param(), value)
    }

    /// Evaluate against a record. A missing field compares as null.
    pub fn matches(&self, record: &Record) -> bool {
        let actual = value_at(record, &self.field).unwrap_or(&Value::Null);
        self.comparator.matches(actual, &self.value)
    }
}

/// Parameters for one fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    pub filters: Vec<FilterCondition>,
    /// Field to sort by; `None` means insertion order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    pub sort_order: SortOrder,
}

impl QueryParams {
    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.filters.push(condition);
        self
    }

    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = order;
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|c| c.matches(record))
    }
}

/// A filter control on a table: a form input plus the comparator its value
/// is applied with.
#[derive(Debug, Clone)]
pub struct FilterDescriptor {
    pub input: FormFieldDescriptor,
    pub comparator: Comparator,
    /// Record field the condition targets; defaults to the input name
    pub field: Option<String>,
}

impl FilterDescriptor {
    pub fn new(input: FormFieldDescriptor, comparator: Comparator) -> Self {
        Self {
            input,
            comparator,
            field: None,
        }
    }

    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.input.name
    }

    /// The condition for a filter value, or `None` when the value is blank.
    pub fn condition(&self, value: &Value) -> Option<FilterCondition> {
        let blank = match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if blank {
            return None;
        }
        let field = self.field.clone().unwrap_or_else(|| self.input.name.clone());
        Some(FilterCondition::new(field, self.comparator, value.clone()))
    }
}
