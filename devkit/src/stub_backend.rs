/*!
Stub dashboard backend.

Serves `/api/...` on `127.0.0.1:<ephemeral>`. Every request is recorded
before it is answered, so a test can count fetches that were issued even
when the reply is still sleeping on an injected delay.
*/

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Canned answer for one method + path
#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: StatusCode,
    pub body: Value,
    pub delay: Duration,
}

impl StubReply {
    pub fn json(body: Value) -> Self {
        Self { status: StatusCode::OK, body, delay: Duration::ZERO }
    }

    pub fn status(status: StatusCode, body: Value) -> Self {
        Self { status, body, delay: Duration::ZERO }
    }

    /// Backend-style failure: `{status: "error", message}`
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::status(status, json!({"status": "error", "message": message}))
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path relative to `/api/`, trailing slash kept
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub received_at: chrono::DateTime<chrono::Utc>,
}

impl RecordedRequest {
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    pub fn is_multipart(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|c| c.starts_with("multipart/form-data"))
    }

    /// Raw body as text, for asserting on multipart parts
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Default)]
struct StubState {
    replies: Mutex<HashMap<(Method, String), StubReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubBackend {
    pub async fn start() -> Result<Self> {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind stub backend")?;
        let addr = listener.local_addr().context("Stub backend has no local address")?;

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("Stub backend stopped: {}", e);
            }
        });
        log::info!("Stub backend listening on {}", addr);

        Ok(Self { addr, state, server })
    }

    /// Base URL to hand to the client (`http://127.0.0.1:<port>/api/`)
    pub fn base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    /// Answer `method path` with `reply` from now on (replaces any earlier reply)
    pub fn respond(&self, method: Method, path: &str, reply: StubReply) {
        self.state
            .replies
            .lock()
            .insert((method, normalize(path)), reply);
    }

    pub fn respond_json(&self, method: Method, path: &str, body: Value) {
        self.respond(method, path, StubReply::json(body));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        let path = normalize(path);
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }

    pub fn total_hits(&self) -> usize {
        self.state.requests.lock().len()
    }

    pub fn last_request_to(&self, path: &str) -> Option<RecordedRequest> {
        self.requests_to(path).pop()
    }

    pub fn clear_requests(&self) {
        self.state.requests.lock().clear();
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn normalize(path: &str) -> String {
    let path = path.trim_start_matches('/');
    let path = path.strip_prefix("api/").unwrap_or(path);
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = normalize(uri.path());
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

    state.requests.lock().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body,
        received_at: chrono::Utc::now(),
    });
    log::debug!("[STUB] {} {}", method, path);

    let reply = state.replies.lock().get(&(method, path.clone())).cloned();
    match reply {
        Some(reply) => {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            (reply.status, Json(reply.body)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": format!("no stub for {path}")})),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_normalized() {
        assert_eq!(normalize("/api/admins"), "admins/");
        assert_eq!(normalize("active_alerts/SP-1/"), "active_alerts/SP-1/");
    }

    #[tokio::test]
    async fn records_and_answers() {
        let stub = StubBackend::start().await.unwrap();
        stub.respond_json(Method::GET, "admins/", json!({"admins": []}));

        let url = format!("{}admins/", stub.base_url());
        let body: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(body, json!({"admins": []}));

        let missing = reqwest::get(format!("{}nope/", stub.base_url())).await.unwrap();
        assert_eq!(missing.status().as_u16(), 404);

        assert_eq!(stub.hits("admins/"), 1);
        assert_eq!(stub.total_hits(), 2);
    }
}
