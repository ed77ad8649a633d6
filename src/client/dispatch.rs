//! Authenticated request pipeline for `/api/tracker/` endpoints.

use reqwest::{Client, Method};
use serde_json::Value;

use super::{ClientError, CredentialManager};
use crate::config::Config;

/// Issues one authenticated call per domain operation and normalizes the
/// outcome into JSON or a [`ClientError`].
#[derive(Clone)]
pub struct Dispatcher {
    http: Client,
    tracker_url: String,
    credentials: CredentialManager,
}

impl Dispatcher {
    pub fn new(http: Client, config: &Config, credentials: CredentialManager) -> Self {
        Self {
            http,
            tracker_url: config.tracker_url(),
            credentials,
        }
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Full URL for an endpoint suffix such as `projects/5/`.
    pub fn endpoint(&self, suffix: &str) -> String {
        format!("{}{}", self.tracker_url, suffix.trim_start_matches('/'))
    }

    /// Perform `method` on `endpoint_suffix` with an optional JSON body and
    /// query parameters.
    ///
    /// Any non-2xx status is a [`ClientError::Remote`]; nothing is retried.
    /// An empty success body (e.g. `204 No Content`) yields `Value::Null`.
    pub async fn dispatch(
        &self,
        method: Method,
        endpoint_suffix: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> Result<Value, ClientError> {
        let token = self.credentials.acquire_valid_credential().await?;
        let url = self.endpoint(endpoint_suffix);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return Err(ClientError::Remote { status, body });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn get(&self, endpoint_suffix: &str) -> Result<Value, ClientError> {
        self.dispatch(Method::GET, endpoint_suffix, None, &[]).await
    }

    pub async fn post(
        &self,
        endpoint_suffix: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        self.dispatch(Method::POST, endpoint_suffix, body, &[]).await
    }

    pub async fn patch(&self, endpoint_suffix: &str, body: &Value) -> Result<Value, ClientError> {
        self.dispatch(Method::PATCH, endpoint_suffix, Some(body), &[]).await
    }

    pub async fn delete(&self, endpoint_suffix: &str) -> Result<Value, ClientError> {
        self.dispatch(Method::DELETE, endpoint_suffix, None, &[]).await
    }
}
