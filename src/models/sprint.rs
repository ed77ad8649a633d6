use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Lifecycle state of a sprint as reported by ApiPort.
///
/// Transitions (planned → active → closed) are enforced by the service; the
/// adapter only reads the value for display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SprintStatus {
    Planned,
    Active,
    Closed,
}

impl SprintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

/// Input for creating a sprint. New sprints always start as `planned`.
#[derive(Debug, Clone, Default)]
pub struct CreateSprintInput {
    pub name: String,
    pub goal: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
    pub velocity_target: Option<u32>,
}

impl CreateSprintInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Request body for `POST projects/{id}/sprints/`. Unset and empty
    /// optional fields are left out.
    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), json!(self.name));
        body.insert("status".into(), json!(SprintStatus::Planned.as_str()));
        insert_text(&mut body, "goal", &self.goal);
        insert_text(&mut body, "start_date", &self.start_date);
        insert_text(&mut body, "end_date", &self.end_date);
        if let Some(target) = self.velocity_target.filter(|t| *t > 0) {
            body.insert("velocity_target".into(), json!(target));
        }
        Value::Object(body)
    }
}

pub(crate) fn insert_text(body: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(text) = value.as_deref().filter(|t| !t.is_empty()) {
        body.insert(key.into(), json!(text));
    }
}

pub(crate) fn insert_id(body: &mut Map<String, Value>, key: &str, value: Option<u64>) {
    if let Some(id) = value.filter(|id| *id > 0) {
        body.insert(key.into(), json!(id));
    }
}
