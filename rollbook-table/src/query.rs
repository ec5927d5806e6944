//! The row source a table fetches from.

use std::future::Future;

use async_trait::async_trait;
use rollbook_common::{value_at, ApiError, Record, SortOrder};
use serde_json::Value;

use crate::filter::{compare_values, QueryParams};

/// Fetches the current row set for a table.
///
/// Each call returns the whole set; the table replaces what it had.
#[async_trait]
pub trait QueryApi: Send + Sync {
    async fn query(&self, params: &QueryParams) -> Result<Vec<Record>, ApiError>;
}

/// Adapts an async closure into a [`QueryApi`].
pub struct FnQuery<F>(pub F);

#[async_trait]
impl<F, Fut> QueryApi for FnQuery<F>
where
    F: Fn(QueryParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Record>, ApiError>> + Send,
{
    async fn query(&self, params: &QueryParams) -> Result<Vec<Record>, ApiError> {
        (self.0)(params.clone()).await
    }
}

/// A [`QueryApi`] over rows already in memory, such as a history list that
/// arrived embedded in a parent record. Filters and sorting apply locally.
#[derive(Debug, Clone, Default)]
pub struct StaticRows {
    rows: Vec<Record>,
}

impl StaticRows {
    /// Rows from a JSON array; anything else gives an empty set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(rows) => Self { rows },
            _ => Self::default(),
        }
    }

    pub fn new(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Apply filters and sorting.
    ///
    /// With no sort field, descending order is the reverse of the stored
    /// order, putting the newest entries first.
    pub fn select(&self, params: &QueryParams) -> Vec<Record> {
        let mut rows: Vec<Record> = self
            .rows
            .iter()
            .filter(|r| params.matches(r))
            .cloned()
            .collect();

        match &params.sort_field {
            Some(field) => {
                rows.sort_by(|a, b| {
                    let a = value_at(a, field).unwrap_or(&Value::Null);
                    let b = value_at(b, field).unwrap_or(&Value::Null);
                    compare_values(a, b)
                });
                if params.sort_order == SortOrder::Desc {
                    rows.reverse();
                }
            }
            None if params.sort_order == SortOrder::Desc => rows.reverse(),
            None => {}
        }
        rows
    }
}

#[async_trait]
impl QueryApi for StaticRows {
    async fn query(&self, params: &QueryParams) -> Result<Vec<Record>, ApiError> {
        Ok(self.select(params))
    }
}
