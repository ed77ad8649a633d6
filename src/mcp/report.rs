//! Sprint progress statistics computed from a project's work items.

use serde_json::Value;

use crate::models::{ItemType, WorkItemStatus};

/// Aggregated progress of one sprint.
///
/// Story points only count `user_story` items; item counts cover every item
/// in the sprint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SprintReport {
    pub sprint_id: u64,
    pub total_points: u64,
    pub completed_points: u64,
    pub total_items: usize,
    pub completed_items: usize,
}

impl SprintReport {
    pub fn compute(sprint_id: u64, items: &[Value]) -> Self {
        let mut report = Self {
            sprint_id,
            ..Default::default()
        };

        for item in items.iter().filter(|i| belongs_to_sprint(i, sprint_id)) {
            let done = has_str(item, "status", WorkItemStatus::Done.as_str());
            report.total_items += 1;
            if done {
                report.completed_items += 1;
            }

            if has_str(item, "item_type", ItemType::UserStory.as_str()) {
                let points = item
                    .get("estimate_points")
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                report.total_points += points;
                if done {
                    report.completed_points += points;
                }
            }
        }

        report
    }

    /// Completed share of story points, 0 when the sprint has none.
    pub fn completion_percent(&self) -> f64 {
        if self.total_points == 0 {
            return 0.0;
        }
        self.completed_points as f64 / self.total_points as f64 * 100.0
    }
}

/// An item's `sprint` is either the sprint ID or an embedded sprint object.
fn belongs_to_sprint(item: &Value, sprint_id: u64) -> bool {
    match item.get("sprint") {
        Some(Value::Object(sprint)) => sprint.get("id").and_then(Value::as_u64) == Some(sprint_id),
        Some(other) => other.as_u64() == Some(sprint_id),
        None => false,
    }
}

fn has_str(item: &Value, key: &str, expected: &str) -> bool {
    item.get(key).and_then(Value::as_str) == Some(expected)
}
