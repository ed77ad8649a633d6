use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::sprint::{insert_id, insert_text};

/// Default priority for new work items (1 = highest, 5 = lowest).
pub const DEFAULT_PRIORITY: u8 = 2;

/// Kind of work item.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    Task,
    UserStory,
    Bug,
    Epic,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::UserStory => "user_story",
            Self::Bug => "bug",
            Self::Epic => "epic",
        }
    }
}

/// Progress state of a work item.
///
/// - `Todo`: Not started
/// - `InProgress`: Someone is working on it
/// - `Done`: Finished; counts toward sprint velocity
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl WorkItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

/// Input for creating a work item. New items always start as `todo`.
#[derive(Debug, Clone)]
pub struct CreateWorkItemInput {
    pub title: String,
    pub description: Option<String>,
    pub item_type: ItemType,
    pub priority: u8,
    pub estimate_points: Option<u32>,
    pub assignee_id: Option<u64>,
    pub sprint_id: Option<u64>,
    /// Parent item for subtasks.
    pub parent_id: Option<u64>,
}

impl CreateWorkItemInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            item_type: ItemType::default(),
            priority: DEFAULT_PRIORITY,
            estimate_points: None,
            assignee_id: None,
            sprint_id: None,
            parent_id: None,
        }
    }

    /// Request body for `POST projects/{id}/work-items/`.
    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("title".into(), json!(self.title));
        body.insert("item_type".into(), json!(self.item_type.as_str()));
        body.insert("priority".into(), json!(self.priority));
        body.insert("status".into(), json!(WorkItemStatus::Todo.as_str()));
        insert_text(&mut body, "description", &self.description);
        if let Some(points) = self.estimate_points.filter(|p| *p > 0) {
            body.insert("estimate_points".into(), json!(points));
        }
        insert_id(&mut body, "assignee_id", self.assignee_id);
        insert_id(&mut body, "sprint_id", self.sprint_id);
        insert_id(&mut body, "parent_id", self.parent_id);
        Value::Object(body)
    }
}

/// Partial update for a work item. Only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkItemUpdate {
    pub status: Option<WorkItemStatus>,
    pub assignee_id: Option<u64>,
    pub sprint_id: Option<u64>,
    pub priority: Option<u8>,
    pub estimate_points: Option<u32>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl WorkItemUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Request body for `PATCH work-items/{id}/`.
    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        if let Some(status) = self.status {
            body.insert("status".into(), json!(status.as_str()));
        }
        if let Some(assignee_id) = self.assignee_id {
            body.insert("assignee_id".into(), json!(assignee_id));
        }
        if let Some(sprint_id) = self.sprint_id {
            body.insert("sprint_id".into(), json!(sprint_id));
        }
        if let Some(priority) = self.priority {
            body.insert("priority".into(), json!(priority));
        }
        if let Some(points) = self.estimate_points {
            body.insert("estimate_points".into(), json!(points));
        }
        if let Some(title) = &self.title {
            body.insert("title".into(), json!(title));
        }
        if let Some(description) = &self.description {
            body.insert("description".into(), json!(description));
        }
        Value::Object(body)
    }
}
