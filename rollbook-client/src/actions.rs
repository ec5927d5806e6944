//! Adapters from REST resources to table, form and button collaborators.

use async_trait::async_trait;
use rollbook_common::{ApiError, Record};
use rollbook_forms::SubmitAction;
use rollbook_overlay::ConfirmAction;
use rollbook_table::{QueryApi, QueryParams};
use serde_json::Value;

use crate::client::RestResource;

#[async_trait]
impl QueryApi for RestResource {
    async fn query(&self, params: &QueryParams) -> Result<Vec<Record>, ApiError> {
        Ok(self.list(params).await?)
    }
}

/// Submits a form by POSTing its values to a collection.
#[derive(Debug, Clone)]
pub struct CreateAction(pub RestResource);

#[async_trait]
impl SubmitAction for CreateAction {
    async fn submit(&self, values: Value) -> Result<Value, ApiError> {
        Ok(self.0.create(&values).await?)
    }
}

/// Submits a form by PUTting its values, on `/{id}` when an id is given and
/// on the collection otherwise.
#[derive(Debug, Clone)]
pub struct UpdateAction {
    resource: RestResource,
    id: Option<Value>,
}

impl UpdateAction {
    pub fn new(resource: RestResource) -> Self {
        Self { resource, id: None }
    }

    pub fn by_id(resource: RestResource, id: Value) -> Self {
        Self {
            resource,
            id: Some(id),
        }
    }
}

#[async_trait]
impl SubmitAction for UpdateAction {
    async fn submit(&self, values: Value) -> Result<Value, ApiError> {
        let response = match &self.id {
            Some(id) => self.resource.update_by_id(id, &values).await?,
            None => self.resource.update(&values).await?,
        };
        Ok(response)
    }
}

/// Deletes one item; used behind a confirmation button.
#[derive(Debug, Clone)]
pub struct DeleteAction {
    resource: RestResource,
    id: Value,
}

impl DeleteAction {
    pub fn new(resource: RestResource, id: Value) -> Self {
        Self { resource, id }
    }
}

#[async_trait]
impl ConfirmAction for DeleteAction {
    async fn run(&self) -> Result<Value, ApiError> {
        Ok(self.resource.delete(&self.id).await?)
    }
}
