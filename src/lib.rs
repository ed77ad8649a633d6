//! ApiPort MCP server.
//!
//! Exposes the ApiPort task manager (projects, sprints, work items) to AI
//! agents as MCP tools and resources.
//!
//! - [`config`]: identity and connection settings
//! - [`client`]: credential lifecycle, request dispatch and the domain facade
//! - [`models`]: typed inputs for mutating calls
//! - [`mcp`]: tool router, resources and text rendering

pub mod client;
pub mod config;
pub mod mcp;
pub mod models;
