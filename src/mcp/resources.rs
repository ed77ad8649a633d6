//! Read-only resources addressed by URI.
//!
//! | URI | Content |
//! |-----|---------|
//! | `project://list` | All projects |
//! | `project://{id}` | One project |
//! | `sprint://{id}` | One sprint |
//! | `backlog://{id}` | Backlog of a project |

use std::str::FromStr;

use rmcp::model::{AnnotateAble, RawResource, Resource};

pub const PROJECT_LIST_URI: &str = "project://list";

/// Parsed resource URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceUri {
    ProjectList,
    Project(u64),
    Sprint(u64),
    Backlog(u64),
}

impl FromStr for ResourceUri {
    type Err = String;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        if uri == PROJECT_LIST_URI {
            return Ok(Self::ProjectList);
        }

        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| format!("Unknown resource: {}", uri))?;
        let id: u64 = rest
            .trim_end_matches('/')
            .parse()
            .map_err(|_| format!("Invalid ID in resource URI: {}", uri))?;

        match scheme {
            "project" => Ok(Self::Project(id)),
            "sprint" => Ok(Self::Sprint(id)),
            "backlog" => Ok(Self::Backlog(id)),
            _ => Err(format!("Unknown resource: {}", uri)),
        }
    }
}

/// Resources advertised by `resources/list`. The ID-addressed schemes are
/// readable but not enumerated.
pub fn list_resources() -> Vec<Resource> {
    let mut projects = RawResource::new(PROJECT_LIST_URI, "Projects List");
    projects.description = Some("List of all accessible projects".to_string());
    projects.mime_type = Some("application/json".to_string());
    vec![projects.no_annotation()]
}
