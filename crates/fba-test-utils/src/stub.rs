//! Canned-response HTTP backend
//!
//! An axum router on an ephemeral localhost port. Every request lands in one
//! fallback handler that records it and answers with the response registered
//! for its method and path; anything unregistered gets a 404 with a `detail`.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Largest request body the stub buffers
const MAX_BODY: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn ok(body: &Value) -> Self {
        Self::json(200, body)
    }

    pub fn detail(status: u16, detail: &str) -> Self {
        Self::json(status, &json!({ "detail": detail }))
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Header value, name matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: String,
    path: String,
    response: StubResponse,
}

type Shared<T> = Arc<Mutex<Vec<T>>>;

#[derive(Clone, Default)]
struct StubState {
    routes: Shared<Route>,
    requests: Shared<RecordedRequest>,
}

/// Mount point of the stubbed API; routes are registered relative to it
pub const API_PREFIX: &str = "/api/v1";

pub struct StubServer {
    addr: SocketAddr,
    state: StubState,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let state = StubState::default();
        let app = Router::new().fallback(answer).with_state(state.clone());
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { addr, state, task }
    }

    /// Register a response; later registrations for the same route win
    pub fn on(&self, method: &str, path: &str, response: StubResponse) -> &Self {
        self.state.routes.lock().push(Route {
            method: method.to_ascii_uppercase(),
            path: format!("{API_PREFIX}{path}"),
            response,
        });
        self
    }

    pub fn base_url(&self) -> String {
        format!("http://{}{API_PREFIX}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        let path = format!("{API_PREFIX}{path}");
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn answer(State(state): State<StubState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_BODY).await.unwrap_or_default();

    let method = parts.method.as_str().to_string();
    let path = parts.uri.path().to_string();
    let response = state
        .routes
        .lock()
        .iter()
        .rev()
        .find(|r| r.method == method && r.path == path)
        .map(|r| r.response.clone())
        .unwrap_or_else(|| StubResponse::detail(404, "Not Found"));

    state.requests.lock().push(RecordedRequest {
        method,
        path,
        query: parts.uri.query().map(str::to_string),
        headers: parts
            .headers
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from(response.body),
    )
        .into_response()
}
