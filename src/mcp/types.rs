//! Request types for MCP tools.

use rmcp::schemars::JsonSchema;
use serde::Deserialize;

use crate::models::{ItemType, WorkItemStatus};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProjectRequest {
    #[schemars(description = "Project ID")]
    pub project_id: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SprintRequest {
    #[schemars(description = "Sprint ID")]
    pub sprint_id: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WorkItemRequest {
    #[schemars(description = "Work item ID")]
    pub work_item_id: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateSprintRequest {
    #[schemars(description = "Project ID")]
    pub project_id: u64,
    #[schemars(description = "Sprint name")]
    pub name: String,
    #[schemars(description = "Sprint goal (optional)")]
    pub goal: Option<String>,
    #[schemars(description = "Start date (YYYY-MM-DD, optional)")]
    pub start_date: Option<String>,
    #[schemars(description = "End date (YYYY-MM-DD, optional)")]
    pub end_date: Option<String>,
    #[schemars(description = "Velocity target in story points (optional)")]
    pub velocity_target: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateWorkItemRequest {
    #[schemars(description = "Project ID")]
    pub project_id: u64,
    #[schemars(description = "Work item title")]
    pub title: String,
    #[schemars(description = "Description (optional)")]
    pub description: Option<String>,
    #[schemars(description = "Type of work item (default: task)")]
    pub item_type: Option<ItemType>,
    #[schemars(description = "Priority 1-5 (default: 2)")]
    pub priority: Option<u8>,
    #[schemars(description = "Story points estimate (optional)")]
    pub estimate_points: Option<u32>,
    #[schemars(description = "User ID to assign to (optional)")]
    pub assignee_id: Option<u64>,
    #[schemars(description = "Sprint ID to assign to (optional)")]
    pub sprint_id: Option<u64>,
    #[schemars(description = "Parent work item ID for subtasks (optional)")]
    pub parent_id: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateWorkItemRequest {
    #[schemars(description = "Work item ID")]
    pub work_item_id: u64,
    #[schemars(description = "Work item status (optional)")]
    pub status: Option<WorkItemStatus>,
    #[schemars(description = "User ID to assign to (optional)")]
    pub assignee_id: Option<u64>,
    #[schemars(description = "Sprint ID to assign to (optional)")]
    pub sprint_id: Option<u64>,
    #[schemars(description = "Priority 1-5 (optional)")]
    pub priority: Option<u8>,
    #[schemars(description = "Story points estimate (optional)")]
    pub estimate_points: Option<u32>,
    #[schemars(description = "New title (optional)")]
    pub title: Option<String>,
    #[schemars(description = "New description (optional)")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BulkAssignRequest {
    #[schemars(description = "Sprint ID")]
    pub sprint_id: u64,
    #[schemars(description = "List of work item IDs to assign")]
    pub work_item_ids: Vec<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddSprintMemberRequest {
    #[schemars(description = "Sprint ID")]
    pub sprint_id: u64,
    #[schemars(description = "User ID to add")]
    pub user_id: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RemoveSprintMemberRequest {
    #[schemars(description = "Sprint ID")]
    pub sprint_id: u64,
    #[schemars(description = "Sprint member ID to remove")]
    pub member_id: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SprintReportRequest {
    #[schemars(description = "Sprint ID")]
    pub sprint_id: u64,
    #[schemars(description = "Project ID the sprint belongs to")]
    pub project_id: u64,
}
