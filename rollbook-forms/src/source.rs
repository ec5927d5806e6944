//! Collaborators a form calls out to: option sources and submit actions.

use std::future::Future;

use async_trait::async_trait;
use rollbook_common::{ApiError, EnumOption};
use rollbook_fields::StaticOptions;
use serde_json::Value;

/// Supplies choices for select inputs.
#[async_trait]
pub trait OptionSource: Send + Sync {
    async fn options(&self, search: &str) -> Result<Vec<EnumOption>, ApiError>;
}

#[async_trait]
impl OptionSource for StaticOptions {
    async fn options(&self, search: &str) -> Result<Vec<EnumOption>, ApiError> {
        Ok(self.search(search))
    }
}

/// Adapts an async closure taking the search text into an [`OptionSource`].
pub struct FnOptions<F>(pub F);

#[async_trait]
impl<F, Fut> OptionSource for FnOptions<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<EnumOption>, ApiError>> + Send,
{
    async fn options(&self, search: &str) -> Result<Vec<EnumOption>, ApiError> {
        (self.0)(search.to_string()).await
    }
}

/// Receives the full value set of a valid form.
#[async_trait]
pub trait SubmitAction: Send + Sync {
    async fn submit(&self, values: Value) -> Result<Value, ApiError>;
}

/// Adapts an async closure into a [`SubmitAction`].
pub struct FnSubmit<F>(pub F);

#[async_trait]
impl<F, Fut> SubmitAction for FnSubmit<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ApiError>> + Send,
{
    async fn submit(&self, values: Value) -> Result<Value, ApiError> {
        (self.0)(values).await
    }
}
