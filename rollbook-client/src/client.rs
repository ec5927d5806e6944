//! HTTP client for the school management API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use rollbook_common::{display_raw, ApiError, Record, SessionContext};
use rollbook_config::ApiConfig;
use rollbook_table::QueryParams;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ClientError, Result};

/// Envelope key wrapping list responses.
const DATA_KEY: &str = "data";

/// Extract a human-readable message from a JSON error body.
///
/// Tries `message` (a string or a list of strings), then `error`, then falls
/// back to the raw body, then to the status reason.
fn extract_error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match json.get("message") {
            Some(Value::String(msg)) => return msg.clone(),
            Some(Value::Array(msgs)) if !msgs.is_empty() => {
                return msgs.iter().map(display_raw).collect::<Vec<_>>().join(", ")
            }
            _ => {}
        }
        if let Some(err) = json.get("error").and_then(Value::as_str) {
            return err.to_string();
        }
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

/// A configured connection to the API: base URL, timeout and bearer token.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl RestClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| ClientError::invalid_url(&base, e))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Authenticate requests with the session's token, if it has one.
    pub fn with_session(mut self, session: &SessionContext) -> Self {
        self.token = session.token.clone();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn resource(&self, path: impl Into<String>) -> RestResource {
        RestResource {
            client: self.clone(),
            path: path.into().trim_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::invalid_url(path, e))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode the JSON body. Error statuses become
    /// [`ApiError`]s; an empty success body decodes as null.
    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value> {
        debug!(%method, %url, "sending request");
        let mut request = self.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = extract_error_message(&text, status);
            warn!(%method, %url, status = status.as_u16(), %message, "request rejected");
            return Err(ApiError::with_status(status.as_u16(), message).into());
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::unexpected_body(e.to_string()))
    }
}

/// One REST collection, such as `class-groups`.
#[derive(Debug, Clone)]
pub struct RestResource {
    client: RestClient,
    path: String,
}

impl RestResource {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A nested path, e.g. `resource.child("school/3")`.
    pub fn child(&self, segment: impl AsRef<str>) -> RestResource {
        self.client
            .resource(format!("{}/{}", self.path, segment.as_ref().trim_matches('/')))
    }

    fn item_path(&self, id: &Value) -> String {
        format!("{}/{}", self.path, display_raw(id))
    }

    /// List the collection.
    ///
    /// Sends `sortOrder` (and `sortField` when set) plus one `filter`
    /// parameter per condition, and unwraps a `{"data": [...]}` envelope.
    pub async fn list(&self, params: &QueryParams) -> Result<Vec<Record>> {
        let mut url = self.client.url(&self.path)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("sortOrder", params.sort_order.as_param());
            if let Some(field) = &params.sort_field {
                query.append_pair("sortField", field);
            }
            for condition in &params.filters {
                query.append_pair("filter", &condition.to_param());
            }
        }

        match self.client.send(Method::GET, url, None).await? {
            Value::Array(rows) => Ok(rows),
            Value::Object(mut envelope) => match envelope.remove(DATA_KEY) {
                Some(Value::Array(rows)) => Ok(rows),
                Some(Value::Null) | None => Ok(Vec::new()),
                Some(other) => Err(ClientError::unexpected_body(format!(
                    "'{DATA_KEY}' is not a list: {other}"
                ))),
            },
            Value::Null => Ok(Vec::new()),
            other => Err(ClientError::unexpected_body(format!(
                "expected a list, got {other}"
            ))),
        }
    }

    /// Fetch one item, unwrapping a `data` envelope when present.
    pub async fn get(&self, id: &Value) -> Result<Value> {
        let url = self.client.url(&self.item_path(id))?;
        Ok(match self.client.send(Method::GET, url, None).await? {
            Value::Object(mut body) if body.contains_key(DATA_KEY) => {
                body.remove(DATA_KEY).unwrap_or(Value::Null)
            }
            body => body,
        })
    }

    pub async fn create(&self, body: &Value) -> Result<Value> {
        let url = self.client.url(&self.path)?;
        self.client.send(Method::POST, url, Some(body)).await
    }

    /// PUT on the collection itself; the body carries the id.
    pub async fn update(&self, body: &Value) -> Result<Value> {
        let url = self.client.url(&self.path)?;
        self.client.send(Method::PUT, url, Some(body)).await
    }

    pub async fn update_by_id(&self, id: &Value, body: &Value) -> Result<Value> {
        let url = self.client.url(&self.item_path(id))?;
        self.client.send(Method::PUT, url, Some(body)).await
    }

    pub async fn delete(&self, id: &Value) -> Result<Value> {
        let url = self.client.url(&self.item_path(id))?;
        self.client.send(Method::DELETE, url, None).await
    }
}
