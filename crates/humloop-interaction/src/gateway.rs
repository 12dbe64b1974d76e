//! HttpGateway - the one HTTP path every backend call takes.
//!
//! Responsibilities:
//! - Attach `Authorization: Bearer <access>` when the session holds a token
//! - Recover from a 401 with exactly one refresh and one retry
//! - Share a single in-flight refresh between concurrent callers
//! - Map transport and status failures into [`HumloopError`]

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use humloop_core::audio::AudioAsset;
use humloop_core::session::SessionStore;
use humloop_core::{HumloopError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const REFRESH_PATH: &str = "token/refresh/";

type PendingRefresh = Shared<BoxFuture<'static, Result<String>>>;

/// One field of a multipart body.
#[derive(Debug, Clone)]
pub enum MultipartField {
    Text { name: String, value: String },
    File { name: String, asset: AudioAsset },
}

impl MultipartField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, asset: AudioAsset) -> Self {
        Self::File {
            name: name.into(),
            asset,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(JsonValue),
    Multipart(Vec<MultipartField>),
}

/// A request description that can be turned into a `reqwest` request more
/// than once. Multipart forms are consumed when sent, so a retry after
/// refresh rebuilds the form from this description.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    public: bool,
    timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            public: false,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, fields: Vec<MultipartField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    /// Never sends a token and never triggers a refresh.
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn is_public(&self) -> bool {
        self.public
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

struct GatewayInner {
    client: Client,
    base_url: String,
    session: Option<Arc<SessionStore>>,
    /// In-flight refresh, keyed by the refresh token it redeems.
    pending_refresh: Mutex<Option<(String, PendingRefresh)>>,
}

/// HTTP client bound to one backend origin.
///
/// Cloning is cheap; clones share the connection pool and the pending
/// refresh slot.
#[derive(Clone)]
pub struct HttpGateway {
    inner: Arc<GatewayInner>,
}

impl HttpGateway {
    /// Gateway that authenticates with `session` and refreshes on 401.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>, timeout: Duration) -> Result<Self> {
        Self::build(base_url.into(), Some(session), timeout)
    }

    /// Gateway that never sends credentials, for origins that must not see
    /// user tokens.
    pub fn unauthenticated(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::build(base_url.into(), None, timeout)
    }

    fn build(base_url: String, session: Option<Arc<SessionStore>>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HumloopError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(GatewayInner {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
                session,
                pending_refresh: Mutex::new(None),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn session(&self) -> Option<&Arc<SessionStore>> {
        self.inner.session.as_ref()
    }

    /// Resolves `path` against the base URL. Absolute URLs pass through.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Sends the request and returns the response if its status is success.
    ///
    /// # Errors
    ///
    /// - `Network`: no response was received
    /// - `Unauthorized`: 401 that could not be recovered; the session is gone
    /// - `NotFound`: 404
    /// - `Api`: any other non-success status
    pub async fn send(&self, request: ApiRequest) -> Result<Response> {
        let response = self.send_raw(&request).await?;
        check_status(&request, response).await
    }

    /// Sends the request and decodes a JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| HumloopError::Serialization {
                format: "JSON".to_string(),
                message: e.to_string(),
            })
    }

    /// Sends the request and discards the body.
    pub async fn send_empty(&self, request: ApiRequest) -> Result<()> {
        self.send(request).await.map(|_| ())
    }

    /// Sends the request and returns the raw body.
    pub async fn fetch_bytes(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let response = self.send(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| HumloopError::network(format!("failed to read response body: {e}")))?;
        Ok(bytes.to_vec())
    }

    /// Sends the request with refresh handling but without status mapping.
    ///
    /// The only status this inspects is 401 on authenticated requests.
    pub async fn send_raw(&self, request: &ApiRequest) -> Result<Response> {
        let session = match (&self.inner.session, request.public) {
            (Some(session), false) => session.clone(),
            _ => return self.dispatch(request, None).await,
        };

        let token = session.access_token().await;
        let response = self.dispatch(request, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = %request.path, "Received 401, attempting recovery");
        let fresh = self.recover_token(&session, token).await?;
        let retried = self.dispatch(request, Some(&fresh)).await?;

        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "Request rejected again after refresh");
            session
                .clear_if(|current| current.access_token.as_deref() == Some(fresh.as_str()))
                .await;
            return Err(HumloopError::unauthorized("session expired"));
        }
        Ok(retried)
    }

    /// Produces a token to retry with after `failed` was rejected.
    ///
    /// If another caller already replaced `failed`, the current token is used
    /// without refreshing. Otherwise this joins the pending refresh or starts
    /// one.
    async fn recover_token(&self, session: &Arc<SessionStore>, failed: Option<String>) -> Result<String> {
        let pending = {
            let mut slot = self.inner.pending_refresh.lock().await;

            let current = session.access_token().await;
            if current != failed {
                return current.ok_or_else(|| HumloopError::unauthorized("session ended"));
            }

            let Some(refresh_token) = session.refresh_token().await else {
                drop(slot);
                info!("No refresh token available, ending session");
                session
                    .clear_if(|current| current.access_token == failed && current.refresh_token.is_none())
                    .await;
                return Err(HumloopError::unauthorized("session expired"));
            };

            match slot.as_ref() {
                Some((redeeming, pending)) if *redeeming == refresh_token => pending.clone(),
                _ => {
                    let pending = self.refresh_future(session.clone(), refresh_token.clone());
                    *slot = Some((refresh_token, pending.clone()));
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        let mut slot = self.inner.pending_refresh.lock().await;
        if slot.as_ref().is_some_and(|(_, current)| current.ptr_eq(&pending)) {
            *slot = None;
        }
        outcome
    }

    /// The refresh itself. The new token is stored before any waiter wakes,
    /// and a failed refresh tears the session down exactly once.
    ///
    /// Both outcomes apply only to the session that held `refresh_token`. If
    /// it was logged out or replaced meanwhile, the result is dropped.
    fn refresh_future(&self, session: Arc<SessionStore>, refresh_token: String) -> PendingRefresh {
        let gateway = self.clone();
        async move {
            let request = ApiRequest::post(REFRESH_PATH)
                .json(json!({ "refresh": refresh_token.as_str() }))
                .public();

            let body = match gateway.send_json::<RefreshResponse>(request).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, "Token refresh failed, ending session");
                    session
                        .clear_if(|current| current.refresh_token.as_deref() == Some(refresh_token.as_str()))
                        .await;
                    return Err(HumloopError::unauthorized("session expired"));
                }
            };

            match session
                .set_refreshed_access_token(&refresh_token, body.access.clone())
                .await
            {
                Ok(()) => {
                    info!("Access token refreshed");
                    Ok(body.access)
                }
                Err(e) if e.is_unauthorized() => Err(e),
                Err(e) => {
                    warn!(error = %e, "Failed to store refreshed token, ending session");
                    session
                        .clear_if(|current| current.refresh_token.as_deref() == Some(refresh_token.as_str()))
                        .await;
                    Err(HumloopError::unauthorized("session expired"))
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response> {
        let url = self.url_for(&request.path);
        let mut builder = self.inner.client.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(fields) => builder.multipart(build_form(fields)?),
        };

        debug!(method = %request.method, url = %url, authenticated = token.is_some(), "Sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| HumloopError::network(format!("{} {}: {}", request.method, url, e)))?;
        debug!(status = response.status().as_u16(), url = %url, "Received response");
        Ok(response)
    }
}

fn build_form(fields: &[MultipartField]) -> Result<Form> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            MultipartField::Text { name, value } => form.text(name.clone(), value.clone()),
            MultipartField::File { name, asset } => {
                let part = Part::bytes(asset.bytes().to_vec())
                    .file_name(asset.file_name().to_string())
                    .mime_str(asset.mime_type())
                    .map_err(|e| HumloopError::internal(format!("invalid MIME type: {e}")))?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

async fn check_status(request: &ApiRequest, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    Err(match status {
        StatusCode::NOT_FOUND => HumloopError::not_found("resource", request.path.clone()),
        StatusCode::UNAUTHORIZED => HumloopError::unauthorized(message),
        _ => HumloopError::api(status.as_u16(), message),
    })
}

/// Pulls a human-readable message out of an error body.
///
/// Understands the shapes the backend uses: `{"detail"}`, `{"message"}`,
/// `{"error"}`, and field maps such as `{"username": ["taken"]}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) else {
        return Some(trimmed.chars().take(200).collect());
    };

    for key in ["detail", "message", "error"] {
        if let Some(text) = value.get(key).and_then(JsonValue::as_str) {
            return Some(text.to_string());
        }
    }

    let object = value.as_object()?;
    let parts: Vec<String> = object
        .iter()
        .filter_map(|(field, messages)| {
            let text = match messages {
                JsonValue::Array(items) => items
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                JsonValue::String(text) => text.clone(),
                _ => return None,
            };
            (!text.is_empty()).then(|| format!("{field}: {text}"))
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join("; "))
}
