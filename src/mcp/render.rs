//! Plain-text rendering of ApiPort entities for tool results.
//!
//! Entities are read as loose JSON: any missing or null field renders as
//! `N/A` instead of failing the tool call.

use serde_json::Value;

use super::report::SprintReport;

const MISSING: &str = "N/A";

/// Display a JSON field, falling back to `N/A`.
pub fn field(entity: &Value, key: &str) -> String {
    field_or(entity, key, MISSING)
}

fn field_or(entity: &Value, key: &str, fallback: &str) -> String {
    match entity.get(key) {
        None | Some(Value::Null) => fallback.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn listing(noun: &str, items: &[Value], line: impl Fn(&Value) -> String) -> String {
    let lines: Vec<String> = items.iter().map(line).collect();
    format!("Found {} {}:\n\n{}", items.len(), noun, lines.join("\n"))
}

// ============================================================
// Projects
// ============================================================

pub fn project_list(projects: &[Value]) -> String {
    listing("projects", projects, |p| {
        format!(
            "- ID {}: {} (status: {})",
            field(p, "id"),
            field(p, "name"),
            field(p, "status")
        )
    })
}

pub fn project_detail(project: &Value) -> String {
    format!(
        "Project: {}\nID: {}\nStatus: {}\nDescription: {}\nCreated: {}",
        field(project, "name"),
        field(project, "id"),
        field(project, "status"),
        field(project, "description"),
        field(project, "created_at")
    )
}

// ============================================================
// Sprints
// ============================================================

pub fn sprint_list(sprints: &[Value]) -> String {
    listing("sprints", sprints, |s| {
        format!(
            "- ID {}: {} (status: {}, {} to {})",
            field(s, "id"),
            field(s, "name"),
            field(s, "status"),
            field(s, "start_date"),
            field(s, "end_date")
        )
    })
}

pub fn sprint_detail(sprint: &Value) -> String {
    format!(
        "Sprint: {}\nID: {}\nStatus: {}\nGoal: {}\nPeriod: {} to {}\nVelocity Target: {}",
        field(sprint, "name"),
        field(sprint, "id"),
        field(sprint, "status"),
        field(sprint, "goal"),
        field(sprint, "start_date"),
        field(sprint, "end_date"),
        field(sprint, "velocity_target")
    )
}

pub fn sprint_created(sprint: &Value) -> String {
    format!(
        "✅ Created sprint '{}' (ID: {})\nStatus: {}\nGoal: {}",
        field(sprint, "name"),
        field(sprint, "id"),
        field(sprint, "status"),
        field(sprint, "goal")
    )
}

/// Confirmation for activate/close. `verb` is the past tense shown to the
/// user, e.g. `Activated`.
pub fn sprint_transitioned(verb: &str, sprint: &Value) -> String {
    format!(
        "✅ {} sprint '{}' (ID: {})\nStatus: {}",
        verb,
        field(sprint, "name"),
        field(sprint, "id"),
        field(sprint, "status")
    )
}

// ============================================================
// Work Items
// ============================================================

pub fn work_item_list(items: &[Value]) -> String {
    listing("work items", items, |i| {
        format!(
            "- ID {}: {} [{}] (status: {}, priority: {}, points: {})",
            field(i, "id"),
            field(i, "title"),
            field(i, "item_type"),
            field(i, "status"),
            field(i, "priority"),
            field(i, "estimate_points")
        )
    })
}

pub fn backlog_list(items: &[Value]) -> String {
    listing("backlog items", items, |i| {
        format!(
            "- ID {}: {} [{}] (priority: {}, points: {})",
            field(i, "id"),
            field(i, "title"),
            field(i, "item_type"),
            field(i, "priority"),
            field(i, "estimate_points")
        )
    })
}

pub fn work_item_detail(item: &Value) -> String {
    let assignee = match item.get("assignee") {
        Some(assignee @ Value::Object(_)) => field(assignee, "email"),
        Some(Value::Null) | None => "Unassigned".to_string(),
        Some(other) => other.to_string(),
    };
    let sprint = match item.get("sprint") {
        Some(sprint @ Value::Object(_)) => field_or(sprint, "name", &field(sprint, "id")),
        _ => field_or(item, "sprint", "Backlog"),
    };

    format!(
        "Work Item: {}\nID: {}\nType: {}\nStatus: {}\nPriority: {}\nEstimate: {} points\nAssignee: {}\nSprint: {}\nDescription: {}",
        field(item, "title"),
        field(item, "id"),
        field(item, "item_type"),
        field(item, "status"),
        field(item, "priority"),
        field(item, "estimate_points"),
        assignee,
        sprint,
        field(item, "description")
    )
}

pub fn work_item_created(item: &Value) -> String {
    format!(
        "✅ Created {}: {} (ID: {})\nStatus: {}\nPriority: {}",
        field(item, "item_type"),
        field(item, "title"),
        field(item, "id"),
        field(item, "status"),
        field(item, "priority")
    )
}

pub fn work_item_updated(item: &Value) -> String {
    format!(
        "✅ Updated work item: {} (ID: {})\nStatus: {}\nPriority: {}",
        field(item, "title"),
        field(item, "id"),
        field(item, "status"),
        field(item, "priority")
    )
}

// ============================================================
// Sprint Planning
// ============================================================

pub fn bulk_assigned(count: usize, sprint_id: u64) -> String {
    format!("✅ Assigned {} items to sprint {}", count, sprint_id)
}

pub fn member_added(user_id: u64, sprint_id: u64) -> String {
    format!("✅ Added user {} to sprint {}", user_id, sprint_id)
}

pub fn member_removed(member_id: u64, sprint_id: u64) -> String {
    format!("✅ Removed member {} from sprint {}", member_id, sprint_id)
}

pub fn sprint_report(sprint: &Value, report: &SprintReport) -> String {
    format!(
        "📊 Sprint Report: {name}\n{rule}\n\
         Sprint ID: {id}\n\
         Status: {status}\n\
         Goal: {goal}\n\
         Period: {start} to {end}\n\n\
         📈 Story Points:\n  Completed: {done_points}\n  Total: {total_points}\n  Progress: {progress:.1}%\n\n\
         ✅ Tasks:\n  Completed: {done_items}\n  Total: {total_items}\n\n\
         🎯 Velocity:\n  Target: {target}\n  Actual: {done_points}",
        name = field(sprint, "name"),
        rule = "=".repeat(50),
        id = field(sprint, "id"),
        status = field(sprint, "status"),
        goal = field(sprint, "goal"),
        start = field(sprint, "start_date"),
        end = field(sprint, "end_date"),
        done_points = report.completed_points,
        total_points = report.total_points,
        progress = report.completion_percent(),
        done_items = report.completed_items,
        total_items = report.total_items,
        target = field(sprint, "velocity_target"),
    )
}
