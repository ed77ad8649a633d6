//! Request models for ApiPort.
//!
//! Entities returned by the service (projects, sprints, work items, sprint
//! members) are passed through as JSON and never persisted locally; the
//! service owns their identity and lifecycle. What lives here are the typed
//! inputs for mutating calls:
//!
//! - [`CreateSprintInput`]: body of a new sprint, always `planned`.
//! - [`CreateWorkItemInput`]: body of a new work item, always `todo`.
//! - [`WorkItemUpdate`]: partial update restricted to the fields the API
//!   accepts.

mod sprint;
mod work_item;

pub use sprint::*;
pub use work_item::*;
