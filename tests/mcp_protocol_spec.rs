//! MCP protocol integration tests.
//!
//! These tests spawn the actual `apiport-mcp mcp` process and communicate
//! via JSON-RPC over stdio. The process talks to an in-process mock ApiPort
//! configured through the environment.
//!
//! The rmcp library uses line-delimited JSON (each message is one line):
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"initialize",...}\n
//! {"jsonrpc":"2.0","id":1,"result":{...}}\n
//! ```

mod support;

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdout, Command, Stdio};

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use support::{unreachable_base_url, MockApiPort};

/// The `apiport-mcp mcp` process with its stdio pipes.
struct ServerProcess {
    child: Child,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl ServerProcess {
    /// Spawn a server talking to `api_url` and complete the MCP handshake.
    fn start(api_url: &str) -> (Self, Value) {
        let mut child = Command::new(env!("CARGO_BIN_EXE_apiport-mcp"))
            .arg("mcp")
            .env("APIPORT_API_URL", api_url)
            .env("APIPORT_EMAIL", "a@b.com")
            .env("APIPORT_PASSWORD", "secret")
            .env_remove("VERIFY_SSL")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn apiport-mcp mcp");
        let stdout = BufReader::new(child.stdout.take().expect("Failed to get stdout"));

        let mut server = Self {
            child,
            stdout,
            next_id: 0,
        };
        let init = server.call(
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "apiport-test", "version": "0.0.0"}
            }),
        );
        server.write_line(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}));
        (server, init)
    }

    fn write_line(&mut self, message: &Value) {
        let stdin = self.child.stdin.as_mut().expect("Failed to get stdin");
        writeln!(stdin, "{}", message).expect("Failed to write message");
        stdin.flush().expect("Failed to flush stdin");
    }

    /// Send a request and return the whole response envelope, skipping any
    /// server notifications in between.
    fn call(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        self.write_line(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}));

        loop {
            let mut line = String::new();
            let read = self.stdout.read_line(&mut line).expect("Failed to read line");
            assert!(read > 0, "server closed stdout while waiting for {}", method);
            let message: Value = serde_json::from_str(line.trim()).expect("Invalid JSON-RPC line");
            if message["id"] == json!(id) {
                return message;
            }
        }
    }

    fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        self.call("tools/call", json!({"name": name, "arguments": arguments}))
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Text of the first content block of a `tools/call` result.
fn tool_text(result: &Value) -> &str {
    result["content"][0]["text"].as_str().unwrap_or_default()
}

// ============================================================
// Protocol Tests
// ============================================================

mod protocol {
    use super::*;

    #[tokio::test]
    async fn initialize_returns_server_info() {
        let (_server, init) = ServerProcess::start(&unreachable_base_url().await);

        assert!(init.get("error").is_none(), "Expected success, got {}", init);
        let result = &init["result"];
        assert_eq!(result["serverInfo"]["name"], "apiport-mcp-server");
        assert!(result["capabilities"].get("tools").is_some());
        assert!(result["capabilities"].get("resources").is_some());
    }

    #[tokio::test]
    async fn tools_list_returns_all_tools_with_schemas() {
        let (mut server, _) = ServerProcess::start(&unreachable_base_url().await);

        let response = server.call("tools/list", json!({}));

        let tools = response["result"]["tools"]
            .as_array()
            .expect("Tools should be array");
        assert_eq!(tools.len(), 16, "Expected 16 tools, got {}", tools.len());
        for tool in tools {
            let name = tool["name"].as_str().unwrap_or("?");
            assert!(tool.get("description").is_some(), "Tool {} missing description", name);
            assert!(tool.get("inputSchema").is_some(), "Tool {} missing inputSchema", name);
        }

        let create = tools
            .iter()
            .find(|t| t["name"] == "create_work_item")
            .expect("create_work_item missing");
        let required = create["inputSchema"]["required"]
            .as_array()
            .expect("required should be array");
        assert!(required.contains(&json!("project_id")));
        assert!(required.contains(&json!("title")));
    }

    #[tokio::test]
    async fn resources_list_advertises_project_list() {
        let (mut server, _) = ServerProcess::start(&unreachable_base_url().await);

        let response = server.call("resources/list", json!({}));

        let resources = response["result"]["resources"]
            .as_array()
            .expect("resources array");
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0]["uri"], "project://list");
    }

    #[tokio::test]
    async fn unknown_resource_is_protocol_error() {
        let (mut server, _) = ServerProcess::start(&unreachable_base_url().await);

        let response = server.call("resources/read", json!({"uri": "epic://1"}));

        assert!(response.get("error").is_some(), "Expected error, got {}", response);
    }
}

// ============================================================
// Tool Call Tests
// ============================================================

mod tool_calls {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn list_projects_round_trips_through_mock() {
        let mock = MockApiPort::start().await;
        mock.respond(
            Method::GET,
            "projects/",
            StatusCode::OK,
            json!({"projects": [{"id": 1, "name": "X", "status": "active"}]}),
        );
        let (mut server, _) = ServerProcess::start(&mock.base_url);

        let response = server.call_tool("list_projects", json!({}));

        assert_eq!(
            tool_text(&response["result"]),
            "Found 1 projects:\n\n- ID 1: X (status: active)"
        );
        assert_eq!(mock.logins(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_service_yields_error_result() {
        let (mut server, _) = ServerProcess::start(&unreachable_base_url().await);

        let response = server.call_tool("get_sprint", json!({"sprint_id": 1}));

        let result = &response["result"];
        assert_eq!(result["isError"], true);
        assert!(tool_text(result).starts_with("Error: "));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn read_sprint_resource() {
        let mock = MockApiPort::start().await;
        mock.respond(
            Method::GET,
            "sprints/4/",
            StatusCode::OK,
            json!({"sprint": {"id": 4, "name": "S4"}}),
        );
        let (mut server, _) = ServerProcess::start(&mock.base_url);

        let response = server.call("resources/read", json!({"uri": "sprint://4"}));

        let contents = &response["result"]["contents"][0];
        let text = contents["text"].as_str().expect("text content");
        let sprint: Value = serde_json::from_str(text).expect("invalid json");
        assert_eq!(sprint["name"], "S4");
        assert_eq!(contents["uri"], "sprint://4");
    }
}
