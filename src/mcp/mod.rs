//! MCP server exposing ApiPort projects, sprints and work items.
//!
//! 16 tools:
//! - Projects: list_projects, get_project
//! - Sprints: list_sprints, get_sprint, create_sprint, activate_sprint, close_sprint
//! - Work items: list_work_items, get_work_item, create_work_item, update_work_item
//! - Planning: get_backlog, bulk_assign_to_sprint, add_sprint_member,
//!   remove_sprint_member, generate_sprint_report
//!
//! Resources: `project://list`, `project://{id}`, `sprint://{id}`, `backlog://{id}`.

pub mod render;
pub mod report;
pub mod resources;
mod types;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ListResourcesResult, PaginatedRequestParam,
        ReadResourceRequestParam, ReadResourceResult, ResourceContents, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
    ServiceExt,
};
use serde_json::Value;

use crate::client::{ApiPortClient, ClientError};
use crate::models::*;
use report::SprintReport;
use resources::ResourceUri;

#[derive(Clone)]
pub struct McpServer {
    client: ApiPortClient,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(client: ApiPortClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// Names of every registered tool.
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }

    /// Turn a client outcome into a tool result. Failures become an error
    /// result with readable text instead of a protocol error.
    fn respond<T>(
        tool: &str,
        result: Result<T, ClientError>,
        render: impl FnOnce(T) -> String,
    ) -> Result<CallToolResult, McpError> {
        match result {
            Ok(value) => Ok(CallToolResult::success(vec![Content::text(render(value))])),
            Err(e) => {
                tracing::error!("Error calling tool {}: {}", tool, e);
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "Error: {}",
                    e
                ))]))
            }
        }
    }

    fn check_priority(priority: Option<u8>) -> Result<(), McpError> {
        match priority {
            Some(p) if !(1..=5).contains(&p) => Err(McpError::invalid_params(
                format!("Invalid priority {}. Must be between 1 and 5", p),
                None,
            )),
            _ => Ok(()),
        }
    }

    /// Fetch the JSON behind a resource URI, pretty-printed.
    pub async fn read_resource_text(&self, uri: &str) -> Result<String, McpError> {
        let resource: ResourceUri = uri
            .parse()
            .map_err(|msg: String| McpError::invalid_params(msg, None))?;

        let value = match resource {
            ResourceUri::ProjectList => self.client.list_projects().await.map(Value::Array),
            ResourceUri::Project(id) => self.client.get_project(id).await,
            ResourceUri::Sprint(id) => self.client.get_sprint(id).await,
            ResourceUri::Backlog(id) => self.client.get_backlog(id).await.map(Value::Array),
        }
        .map_err(|e| {
            tracing::error!("Error reading resource {}: {}", uri, e);
            McpError::internal_error(e.to_string(), None)
        })?;

        serde_json::to_string_pretty(&value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

#[tool_router]
impl McpServer {
    // ============================================================
    // Project Tools
    // ============================================================

    #[tool(description = "List all accessible ApiPort projects")]
    pub async fn list_projects(&self) -> Result<CallToolResult, McpError> {
        let result = self.client.list_projects().await;
        Self::respond("list_projects", result, |p| render::project_list(&p))
    }

    #[tool(description = "Get detailed information about a specific project")]
    pub async fn get_project(
        &self,
        params: Parameters<ProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self.client.get_project(req.project_id).await;
        Self::respond("get_project", result, |p| render::project_detail(&p))
    }

    // ============================================================
    // Sprint Tools
    // ============================================================

    #[tool(description = "List all sprints for a project")]
    pub async fn list_sprints(
        &self,
        params: Parameters<ProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self.client.list_sprints(req.project_id).await;
        Self::respond("list_sprints", result, |s| render::sprint_list(&s))
    }

    #[tool(description = "Get detailed information about a specific sprint")]
    pub async fn get_sprint(
        &self,
        params: Parameters<SprintRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self.client.get_sprint(req.sprint_id).await;
        Self::respond("get_sprint", result, |s| render::sprint_detail(&s))
    }

    #[tool(
        description = "Create a new sprint for a project. The sprint starts in 'planned' status; use activate_sprint to start it."
    )]
    pub async fn create_sprint(
        &self,
        params: Parameters<CreateSprintRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let input = CreateSprintInput {
            name: req.name,
            goal: req.goal,
            start_date: req.start_date,
            end_date: req.end_date,
            velocity_target: req.velocity_target,
        };

        let result = self.client.create_sprint(req.project_id, &input).await;
        Self::respond("create_sprint", result, |s| render::sprint_created(&s))
    }

    #[tool(description = "Activate a planned sprint to start work")]
    pub async fn activate_sprint(
        &self,
        params: Parameters<SprintRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self.client.activate_sprint(req.sprint_id).await;
        Self::respond("activate_sprint", result, |s| {
            render::sprint_transitioned("Activated", &s)
        })
    }

    #[tool(description = "Close an active sprint")]
    pub async fn close_sprint(
        &self,
        params: Parameters<SprintRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self.client.close_sprint(req.sprint_id).await;
        Self::respond("close_sprint", result, |s| {
            render::sprint_transitioned("Closed", &s)
        })
    }

    // ============================================================
    // Work Item Tools
    // ============================================================

    #[tool(description = "List all work items for a project")]
    pub async fn list_work_items(
        &self,
        params: Parameters<ProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self.client.list_work_items(req.project_id).await;
        Self::respond("list_work_items", result, |i| render::work_item_list(&i))
    }

    #[tool(description = "Get detailed information about a specific work item")]
    pub async fn get_work_item(
        &self,
        params: Parameters<WorkItemRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self.client.get_work_item(req.work_item_id).await;
        Self::respond("get_work_item", result, |i| render::work_item_detail(&i))
    }

    #[tool(
        description = "Create a new work item (task, user story, bug, or epic). Defaults: item_type 'task', priority 2. New items start in 'todo' status."
    )]
    pub async fn create_work_item(
        &self,
        params: Parameters<CreateWorkItemRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        Self::check_priority(req.priority)?;

        let input = CreateWorkItemInput {
            title: req.title,
            description: req.description,
            item_type: req.item_type.unwrap_or_default(),
            priority: req.priority.unwrap_or(DEFAULT_PRIORITY),
            estimate_points: req.estimate_points,
            assignee_id: req.assignee_id,
            sprint_id: req.sprint_id,
            parent_id: req.parent_id,
        };

        let result = self.client.create_work_item(req.project_id, &input).await;
        Self::respond("create_work_item", result, |i| render::work_item_created(&i))
    }

    #[tool(
        description = "Update work item fields (status, assignee, sprint, priority, estimate, title, description). Only the fields you pass are changed."
    )]
    pub async fn update_work_item(
        &self,
        params: Parameters<UpdateWorkItemRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        Self::check_priority(req.priority)?;

        let update = WorkItemUpdate {
            status: req.status,
            assignee_id: req.assignee_id,
            sprint_id: req.sprint_id,
            priority: req.priority,
            estimate_points: req.estimate_points,
            title: req.title,
            description: req.description,
        };

        let result = self.client.update_work_item(req.work_item_id, &update).await;
        Self::respond("update_work_item", result, |i| render::work_item_updated(&i))
    }

    // ============================================================
    // Planning Tools
    // ============================================================

    #[tool(description = "Get all backlog items (unassigned to sprint) for a project")]
    pub async fn get_backlog(
        &self,
        params: Parameters<ProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self.client.get_backlog(req.project_id).await;
        Self::respond("get_backlog", result, |i| render::backlog_list(&i))
    }

    #[tool(description = "Assign multiple work items to a sprint at once")]
    pub async fn bulk_assign_to_sprint(
        &self,
        params: Parameters<BulkAssignRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self
            .client
            .bulk_assign_to_sprint(req.sprint_id, &req.work_item_ids)
            .await;
        let count = req.work_item_ids.len();
        Self::respond("bulk_assign_to_sprint", result, |_| {
            render::bulk_assigned(count, req.sprint_id)
        })
    }

    #[tool(description = "Add a team member to a sprint")]
    pub async fn add_sprint_member(
        &self,
        params: Parameters<AddSprintMemberRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self
            .client
            .add_sprint_member(req.sprint_id, req.user_id)
            .await;
        Self::respond("add_sprint_member", result, |_| {
            render::member_added(req.user_id, req.sprint_id)
        })
    }

    #[tool(description = "Remove a team member from a sprint")]
    pub async fn remove_sprint_member(
        &self,
        params: Parameters<RemoveSprintMemberRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self
            .client
            .remove_sprint_member(req.sprint_id, req.member_id)
            .await;
        Self::respond("remove_sprint_member", result, |_| {
            render::member_removed(req.member_id, req.sprint_id)
        })
    }

    #[tool(
        description = "Generate comprehensive sprint report with statistics: story points (user stories only), completed tasks, and velocity against target"
    )]
    pub async fn generate_sprint_report(
        &self,
        params: Parameters<SprintReportRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let (sprint, items) = tokio::join!(
            self.client.get_sprint(req.sprint_id),
            self.client.list_work_items(req.project_id)
        );

        let result = sprint.and_then(|sprint| items.map(|items| (sprint, items)));
        Self::respond("generate_sprint_report", result, |(sprint, items)| {
            let report = SprintReport::compute(req.sprint_id, &items);
            render::sprint_report(&sprint, &report)
        })
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "apiport-mcp-server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(
            resources::list_resources(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let text = self.read_resource_text(&request.uri).await?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}

const INSTRUCTIONS: &str = r#"ApiPort task manager: projects contain sprints and work items.

DISCOVERY:
- list_projects / get_project: find the project you work on
- list_sprints / get_sprint: sprint status and dates
- list_work_items / get_work_item / get_backlog: items and their state

SPRINT PLANNING:
1. create_sprint (starts as 'planned')
2. bulk_assign_to_sprint with backlog item IDs
3. add_sprint_member for each participant
4. activate_sprint to start, close_sprint when done
5. generate_sprint_report for points, tasks and velocity

WORK ITEMS:
- create_work_item: item_type is task, user_story, bug or epic; priority 1 (highest) to 5
- update_work_item: change only the fields you pass; status is todo, in_progress or done

RESOURCES:
- project://list, project://{id}, sprint://{id}, backlog://{project_id}"#;

/// Serve MCP over stdin/stdout until the peer disconnects.
pub async fn run_stdio_server(client: ApiPortClient) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(client);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
