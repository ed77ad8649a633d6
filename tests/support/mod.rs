//! In-process mock of the ApiPort REST API.
//!
//! Serves the token endpoint and any `/api/tracker/` route registered with
//! [`MockApiPort::respond`]; records every tracker request so tests can
//! assert on URL, headers and body.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use apiport_mcp::client::ApiPortClient;
use apiport_mcp::config::Config;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};

pub const TOKEN_PATH: &str = "/api/accounts/token/";

/// A tracker request as seen by the mock.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

struct MockState {
    logins: AtomicUsize,
    login_bodies: Mutex<Vec<Value>>,
    login_reply: Mutex<(StatusCode, Value)>,
    login_delay: Mutex<Duration>,
    route_delay: Mutex<Duration>,
    routes: Mutex<HashMap<(Method, String), (StatusCode, Value)>>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockApiPort {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockApiPort {
    /// Start a mock whose login returns `{"access": "T1", "refresh": "R1"}`.
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            logins: AtomicUsize::new(0),
            login_bodies: Mutex::new(Vec::new()),
            login_reply: Mutex::new((StatusCode::OK, json!({"access": "T1", "refresh": "R1"}))),
            login_delay: Mutex::new(Duration::ZERO),
            route_delay: Mutex::new(Duration::ZERO),
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to read mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn login_reply(&self, status: StatusCode, body: Value) {
        *self.state.login_reply.lock().unwrap() = (status, body);
    }

    pub fn login_delay(&self, delay: Duration) {
        *self.state.login_delay.lock().unwrap() = delay;
    }

    /// Delay every tracker reply by `delay`.
    pub fn route_delay(&self, delay: Duration) {
        *self.state.route_delay.lock().unwrap() = delay;
    }

    /// Register a reply for `method` on a tracker path such as `projects/`.
    pub fn respond(&self, method: Method, suffix: &str, status: StatusCode, body: Value) {
        let path = format!("/api/tracker/{}", suffix);
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path), (status, body));
    }

    pub fn logins(&self) -> usize {
        self.state.logins.load(Ordering::SeqCst)
    }

    pub fn login_bodies(&self) -> Vec<Value> {
        self.state.login_bodies.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests()
            .pop()
            .expect("mock received no tracker requests")
    }

    pub fn config(&self) -> Config {
        Config::new(
            Some(self.base_url.clone()),
            Some("a@b.com".to_string()),
            Some("secret".to_string()),
            true,
        )
        .expect("valid mock config")
    }

    pub fn client(&self) -> ApiPortClient {
        ApiPortClient::new(&self.config()).expect("Failed to build client")
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    if uri.path() == TOKEN_PATH && method == Method::POST {
        state.logins.fetch_add(1, Ordering::SeqCst);
        if let Some(body) = body {
            state.login_bodies.lock().unwrap().push(body);
        }
        let delay = *state.login_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let (status, reply) = state.login_reply.lock().unwrap().clone();
        return (status, Json(reply)).into_response();
    }

    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let delay = *state.route_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let reply = state
        .routes
        .lock()
        .unwrap()
        .get(&(method, uri.path().to_string()))
        .cloned();

    match reply {
        Some((status, _)) if status == StatusCode::NO_CONTENT => status.into_response(),
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

/// A base URL nothing is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind throwaway listener");
    let addr = listener.local_addr().expect("Failed to read throwaway address");
    drop(listener);
    format!("http://{}", addr)
}

/// A server that answers with a 500 whose declared body is cut off
/// mid-stream. Logins succeed unless `truncate_login` is set.
pub async fn truncated_error_base_url(truncate_login: bool) -> String {
    use tokio::io::AsyncWriteExt;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind truncating server");
    let addr = listener.local_addr().expect("Failed to read address");

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Some(path) = read_request_path(&mut socket).await else {
                    return;
                };
                let reply = if path == TOKEN_PATH && !truncate_login {
                    let body = r#"{"access":"T1"}"#;
                    format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    )
                } else {
                    "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial"
                        .to_string()
                };
                socket.write_all(reply.as_bytes()).await.ok();
                socket.shutdown().await.ok();
            });
        }
    });

    format!("http://{}", addr)
}

/// Read one HTTP request (head and declared body) and return its path.
async fn read_request_path(socket: &mut tokio::net::TcpStream) -> Option<String> {
    use tokio::io::AsyncReadExt;

    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    head.split_whitespace().nth(1).map(str::to_string)
}
