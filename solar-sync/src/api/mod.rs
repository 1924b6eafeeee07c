//! HTTP client for the dashboard backend.
//!
//! One `ApiClient` per process, built from `BackendConfig`; every call site
//! goes through it so the base URL lives in exactly one place.

pub mod endpoints;

pub use endpoints::{Endpoint, PathParams};

use crate::config::BackendConfig;
use crate::error::{SyncError, SyncResult};
use crate::session::SessionHandle;
use reqwest::{multipart, Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Decoded body of a mutation answer
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: Option<String>,
    pub message: Option<String>,
    pub body: Value,
}

impl ApiReply {
    fn from_body(body: Value) -> Self {
        let status = body.get("status").and_then(Value::as_str).map(str::to_string);
        let message = message_of(&body);
        Self { status, message, body }
    }

    /// 2xx replies count as success unless the body says otherwise
    pub fn is_success(&self) -> bool {
        self.status.as_deref().map_or(true, |s| s == "success")
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    session: Option<SessionHandle>,
}

impl ApiClient {
    pub fn new(config: &BackendConfig) -> SyncResult<Self> {
        let mut raw = config.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw).map_err(|e| SyncError::BaseUrl(format!("{raw}: {e}")))?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("solar-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base, session: None })
    }

    /// Attach the session whose token is forwarded with each request
    pub fn with_session(mut self, session: SessionHandle) -> Self {
        self.session = Some(session);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, endpoint: Endpoint, params: &PathParams) -> SyncResult<Url> {
        let path = endpoint.path(params)?;
        self.base
            .join(&path)
            .map_err(|e| SyncError::BaseUrl(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.session.as_ref().and_then(|s| s.token()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET a polled resource and return its JSON body
    pub async fn get_json(&self, endpoint: Endpoint, params: &PathParams) -> SyncResult<Value> {
        let url = self.url(endpoint, params)?;
        debug!("GET {}", url);
        let response = self.request(Method::GET, url).send().await?;
        read_body(response).await
    }

    /// Send a JSON mutation with the endpoint's method
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        params: &PathParams,
        body: &B,
    ) -> SyncResult<ApiReply> {
        let url = self.url(endpoint, params)?;
        let method = endpoint.method();
        debug!("{} {}", method, url);
        let response = self.request(method, url).json(body).send().await?;
        read_body(response).await.map(ApiReply::from_body)
    }

    /// Send a bodiless mutation (e.g. completing a task)
    pub async fn send_empty(&self, endpoint: Endpoint, params: &PathParams) -> SyncResult<ApiReply> {
        let url = self.url(endpoint, params)?;
        let method = endpoint.method();
        debug!("{} {}", method, url);
        let response = self.request(method, url).send().await?;
        read_body(response).await.map(ApiReply::from_body)
    }

    /// Multipart POST (plant registration with its permits file)
    pub async fn send_multipart(
        &self,
        endpoint: Endpoint,
        params: &PathParams,
        form: multipart::Form,
    ) -> SyncResult<ApiReply> {
        let url = self.url(endpoint, params)?;
        debug!("{} {} (multipart)", endpoint.method(), url);
        let response = self.request(endpoint.method(), url).multipart(form).send().await?;
        read_body(response).await.map(ApiReply::from_body)
    }
}

async fn read_body(response: Response) -> SyncResult<Value> {
    let status = response.status();
    let text = response.text().await?;
    let body: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) if !status.is_success() => Value::String(text.clone()),
            Err(e) => return Err(e.into()),
        }
    };

    if status.is_success() {
        Ok(body)
    } else {
        Err(SyncError::Status { status, message: message_of(&body).unwrap_or_default() })
    }
}

/// The backend reports problems under `message` or `error`, sometimes as a bare string
fn message_of(body: &Value) -> Option<String> {
    match body {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => ["message", "error"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:8000/api".into(),
            ..BackendConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        let url = client.url(Endpoint::Admins, &PathParams::default()).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/admins/");
    }

    #[test]
    fn garbage_base_url_is_rejected() {
        let config = BackendConfig { base_url: "not a url".into(), ..BackendConfig::default() };
        assert!(matches!(ApiClient::new(&config), Err(SyncError::BaseUrl(_))));
    }

    #[test]
    fn reply_status_decides_success() {
        assert!(ApiReply::from_body(json!({"message": "Admin registered successfully"})).is_success());
        let failed = ApiReply::from_body(json!({"status": "error", "message": "Admin not found"}));
        assert!(!failed.is_success());
        assert_eq!(failed.message.as_deref(), Some("Admin not found"));
    }

    #[test]
    fn message_falls_back_to_error_key() {
        assert_eq!(message_of(&json!({"error": "Invalid plant ID"})).as_deref(), Some("Invalid plant ID"));
        assert_eq!(message_of(&json!([1, 2])), None);
    }
}
