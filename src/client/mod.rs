//! HTTP client for the ApiPort task manager API.
//!
//! Three layers, leaf first:
//! - [`CredentialManager`] keeps a valid bearer token for the configured
//!   identity, logging in again when it nears expiry.
//! - [`Dispatcher`] attaches that token to one `/api/tracker/` call and
//!   classifies the outcome.
//! - [`ApiPortClient`] is the facade with one method per domain operation.

mod credentials;
mod dispatch;
mod error;

pub use credentials::{CredentialManager, CredentialStatus, REFRESH_MARGIN, TOKEN_LIFETIME};
pub use dispatch::Dispatcher;
pub use error::ClientError;

use reqwest::Client;
use serde_json::{json, Map, Value};

use crate::config::{Config, CONNECT_TIMEOUT};
use crate::models::*;

/// Client facade for ApiPort projects, sprints and work items.
///
/// Constructed once by the entry point and handed to whoever needs it.
/// Clones share the same connection pool and credential.
#[derive(Clone)]
pub struct ApiPortClient {
    dispatcher: Dispatcher,
}

impl ApiPortClient {
    /// Create a client for `config`. No network traffic happens until the
    /// first call.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(config.timeout))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| ClientError::Configuration(format!("HTTP client: {}", e)))?;

        if !config.verify_ssl {
            tracing::warn!("TLS certificate verification is disabled");
        }

        let credentials = CredentialManager::new(http.clone(), config);
        Ok(Self {
            dispatcher: Dispatcher::new(http, config, credentials),
        })
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn credentials(&self) -> &CredentialManager {
        self.dispatcher.credentials()
    }

    // ============================================================
    // Project Operations
    // ============================================================

    /// List all projects visible to the account.
    pub async fn list_projects(&self) -> Result<Vec<Value>, ClientError> {
        let data = self.dispatcher.get("projects/").await?;
        Ok(take_list(data, "projects"))
    }

    pub async fn get_project(&self, project_id: u64) -> Result<Value, ClientError> {
        let data = self
            .dispatcher
            .get(&format!("projects/{}/", project_id))
            .await?;
        Ok(take_object(data, "project"))
    }

    // ============================================================
    // Sprint Operations
    // ============================================================

    pub async fn list_sprints(&self, project_id: u64) -> Result<Vec<Value>, ClientError> {
        let data = self
            .dispatcher
            .get(&format!("projects/{}/sprints/", project_id))
            .await?;
        Ok(take_list(data, "sprints"))
    }

    pub async fn get_sprint(&self, sprint_id: u64) -> Result<Value, ClientError> {
        let data = self
            .dispatcher
            .get(&format!("sprints/{}/", sprint_id))
            .await?;
        Ok(take_object(data, "sprint"))
    }

    /// Create a sprint in `planned` state.
    pub async fn create_sprint(
        &self,
        project_id: u64,
        input: &CreateSprintInput,
    ) -> Result<Value, ClientError> {
        let data = self
            .dispatcher
            .post(
                &format!("projects/{}/sprints/", project_id),
                Some(&input.payload()),
            )
            .await?;
        Ok(take_object(data, "sprint"))
    }

    /// Start a planned sprint.
    pub async fn activate_sprint(&self, sprint_id: u64) -> Result<Value, ClientError> {
        let data = self
            .dispatcher
            .post(&format!("sprints/{}/activate/", sprint_id), None)
            .await?;
        Ok(take_object(data, "sprint"))
    }

    /// Close an active sprint.
    pub async fn close_sprint(&self, sprint_id: u64) -> Result<Value, ClientError> {
        let data = self
            .dispatcher
            .post(&format!("sprints/{}/close/", sprint_id), None)
            .await?;
        Ok(take_object(data, "sprint"))
    }

    // ============================================================
    // Work Item Operations
    // ============================================================

    pub async fn list_work_items(&self, project_id: u64) -> Result<Vec<Value>, ClientError> {
        let data = self
            .dispatcher
            .get(&format!("projects/{}/work-items/", project_id))
            .await?;
        Ok(take_list(data, "work_items"))
    }

    pub async fn get_work_item(&self, work_item_id: u64) -> Result<Value, ClientError> {
        let data = self
            .dispatcher
            .get(&format!("work-items/{}/", work_item_id))
            .await?;
        Ok(take_object(data, "work_item"))
    }

    /// Create a work item in `todo` state.
    pub async fn create_work_item(
        &self,
        project_id: u64,
        input: &CreateWorkItemInput,
    ) -> Result<Value, ClientError> {
        let data = self
            .dispatcher
            .post(
                &format!("projects/{}/work-items/", project_id),
                Some(&input.payload()),
            )
            .await?;
        Ok(take_object(data, "work_item"))
    }

    /// Apply a partial update. An update with no fields is rejected without
    /// contacting the service.
    pub async fn update_work_item(
        &self,
        work_item_id: u64,
        update: &WorkItemUpdate,
    ) -> Result<Value, ClientError> {
        if update.is_empty() {
            return Err(ClientError::InvalidInput(
                "update_work_item needs at least one field to change".to_string(),
            ));
        }

        let data = self
            .dispatcher
            .patch(&format!("work-items/{}/", work_item_id), &update.payload())
            .await?;
        Ok(take_object(data, "work_item"))
    }

    // ============================================================
    // Backlog Operations
    // ============================================================

    /// Work items of a project that are not assigned to any sprint.
    pub async fn get_backlog(&self, project_id: u64) -> Result<Vec<Value>, ClientError> {
        let data = self
            .dispatcher
            .get(&format!("projects/{}/backlog/", project_id))
            .await?;
        Ok(take_list(data, "work_items"))
    }

    /// Assign many work items to a sprint in one call. Returns the raw
    /// response.
    pub async fn bulk_assign_to_sprint(
        &self,
        sprint_id: u64,
        work_item_ids: &[u64],
    ) -> Result<Value, ClientError> {
        self.dispatcher
            .post(
                &format!("sprints/{}/bulk-assign/", sprint_id),
                Some(&json!({ "work_item_ids": work_item_ids })),
            )
            .await
    }

    // ============================================================
    // Sprint Member Operations
    // ============================================================

    pub async fn add_sprint_member(
        &self,
        sprint_id: u64,
        user_id: u64,
    ) -> Result<Value, ClientError> {
        self.dispatcher
            .post(
                &format!("sprints/{}/members/", sprint_id),
                Some(&json!({ "user_id": user_id })),
            )
            .await
    }

    pub async fn remove_sprint_member(
        &self,
        sprint_id: u64,
        member_id: u64,
    ) -> Result<Value, ClientError> {
        self.dispatcher
            .delete(&format!("sprints/{}/members/{}/", sprint_id, member_id))
            .await
    }
}

/// Extract `key` from a response object, defaulting to an empty object.
fn take_object(data: Value, key: &str) -> Value {
    match data {
        Value::Object(mut map) => map.remove(key).unwrap_or_else(|| Value::Object(Map::new())),
        _ => Value::Object(Map::new()),
    }
}

/// Extract the array under `key` from a response object, defaulting to empty.
fn take_list(data: Value, key: &str) -> Vec<Value> {
    match take_object(data, key) {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}
