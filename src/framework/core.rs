//! # Core Transport
//!
//! This module defines the request plumbing every client in the crate sits on.
//!
//! ## Key Types
//!
//! - [`ApiCall`]: what to send (method, path, query, body).
//! - [`HttpActor`]: owns the `reqwest::Client` and performs calls.
//! - [`ApiClient`]: the cloneable handle that sends calls to the actor and decodes replies.
//! - [`ApiResponse`]: the `{ status, data }` wrapper every call returns.
//!
//! ## Cancellation
//!
//! Each call runs in its own task inside the actor. If the caller drops the future
//! (a superseded query, an aborted task), the response channel closes and the
//! in-flight HTTP request is dropped with it.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::framework::{ApiError, Blob, Query};

// =============================================================================
// 1. REQUESTS
// =============================================================================

/// A file part for multipart uploads.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl MultipartFile {
    /// A CSV file under the `file` form field.
    pub fn csv(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            field: "file".to_string(),
            file_name: file_name.into(),
            content_type: "text/csv".to_string(),
            bytes: bytes.into(),
        }
    }
}

/// One HTTP exchange, described independently of the transport that performs it.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Get {
        path: String,
        query: Query,
    },
    Post {
        path: String,
        query: Query,
        body: Option<Value>,
    },
    Put {
        path: String,
        body: Value,
    },
    Upload {
        path: String,
        file: MultipartFile,
    },
    /// A GET whose response is binary (CSV, PDF, images, spreadsheets).
    Download {
        path: String,
        query: Query,
    },
}

impl ApiCall {
    pub fn method(&self) -> &'static str {
        match self {
            ApiCall::Get { .. } | ApiCall::Download { .. } => "GET",
            ApiCall::Post { .. } | ApiCall::Upload { .. } => "POST",
            ApiCall::Put { .. } => "PUT",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ApiCall::Get { path, .. }
            | ApiCall::Post { path, .. }
            | ApiCall::Put { path, .. }
            | ApiCall::Upload { path, .. }
            | ApiCall::Download { path, .. } => path,
        }
    }

    pub fn query(&self) -> Option<&Query> {
        match self {
            ApiCall::Get { query, .. }
            | ApiCall::Post { query, .. }
            | ApiCall::Download { query, .. } => Some(query),
            ApiCall::Put { .. } | ApiCall::Upload { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiCall::Post { body, .. } => body.as_ref(),
            ApiCall::Put { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl fmt::Display for ApiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// Type alias for the one-shot response channel used by the transport.
pub type Response<T> = oneshot::Sender<Result<T, ApiError>>;

/// Message sent to the transport actor.
#[derive(Debug)]
pub struct ApiRequest {
    pub call: ApiCall,
    pub respond_to: Response<RawResponse>,
}

/// Undecoded reply. Any status may appear here; [`ApiClient`] interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Bytes,
}

impl RawResponse {
    pub fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            content_disposition: None,
            body: Bytes::from(value.to_string()),
        }
    }

    pub fn binary(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.into()),
            content_disposition: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON. An empty body decodes as `null`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// The `{ status, data }` wrapper returned by every call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn into_data(self) -> T {
        self.data
    }
}

// =============================================================================
// 2. THE HTTP ACTOR
// =============================================================================

/// Owns the HTTP client and serves [`ApiRequest`]s until every [`ApiClient`] is dropped.
pub struct HttpActor {
    receiver: mpsc::Receiver<ApiRequest>,
    http: reqwest::Client,
    base_url: String,
}

impl HttpActor {
    pub fn new(config: &ClientConfig) -> Result<(Self, ApiClient), ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = config.auth_token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::validation(format!("invalid auth token: {e}")))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Transport(format!("HTTP client error: {e}")))?;

        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let actor = Self {
            receiver,
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        };
        Ok((actor, ApiClient::new(sender)))
    }

    /// Runs the dispatch loop. Each request gets its own task so slow calls never
    /// hold up the queue.
    pub async fn run(mut self) {
        info!(base_url = %self.base_url, "Transport started");
        let mut served: u64 = 0;

        while let Some(request) = self.receiver.recv().await {
            served += 1;
            let http = self.http.clone();
            let base_url = self.base_url.clone();
            tokio::spawn(dispatch(http, base_url, request));
        }

        info!(served, "Transport shutdown");
    }
}

async fn dispatch(http: reqwest::Client, base_url: String, request: ApiRequest) {
    let ApiRequest {
        call,
        mut respond_to,
    } = request;
    let label = call.to_string();
    debug!(call = %label, "Dispatch");

    let builder = match build_request(&http, &base_url, call) {
        Ok(builder) => builder,
        Err(e) => {
            let _ = respond_to.send(Err(e));
            return;
        }
    };

    let outcome = tokio::select! {
        result = execute(builder) => Some(result),
        _ = respond_to.closed() => None,
    };

    match outcome {
        Some(result) => {
            if let Ok(raw) = &result {
                debug!(call = %label, status = raw.status, bytes = raw.body.len(), "Completed");
            }
            let _ = respond_to.send(result);
        }
        None => debug!(call = %label, "Caller went away, request aborted"),
    }
}

fn build_request(
    http: &reqwest::Client,
    base_url: &str,
    call: ApiCall,
) -> Result<reqwest::RequestBuilder, ApiError> {
    let url = format!("{}/{}", base_url, call.path().trim_start_matches('/'));
    let builder = match call {
        ApiCall::Get { query, .. } => http.get(url).query(query.pairs()),
        ApiCall::Post { query, body, .. } => {
            let builder = http.post(url).query(query.pairs());
            match body {
                Some(body) => builder.json(&body),
                None => builder,
            }
        }
        ApiCall::Put { body, .. } => http.put(url).json(&body),
        ApiCall::Upload { file, .. } => {
            let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
                .file_name(file.file_name)
                .mime_str(&file.content_type)
                .map_err(|e| ApiError::Encode(e.to_string()))?;
            let form = reqwest::multipart::Form::new().part(file.field, part);
            http.post(url).multipart(form)
        }
        ApiCall::Download { query, .. } => http
            .get(url)
            .query(query.pairs())
            .header(header::ACCEPT, "*/*"),
    };
    Ok(builder)
}

async fn execute(builder: reqwest::RequestBuilder) -> Result<RawResponse, ApiError> {
    let response = builder.send().await.map_err(ApiError::from_transport)?;
    let status = response.status().as_u16();
    let header_text = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let content_type = header_text(header::CONTENT_TYPE);
    let content_disposition = header_text(header::CONTENT_DISPOSITION);
    let body = response.bytes().await.map_err(ApiError::from_transport)?;

    Ok(RawResponse {
        status,
        content_type,
        content_disposition,
        body,
    })
}

// =============================================================================
// 3. THE CLIENT HANDLE
// =============================================================================

/// Callback invoked for every failed request that is not a cancellation.
pub type ErrorHook = Arc<dyn Fn(&ApiError) + Send + Sync>;

/// A cloneable handle for issuing API calls.
#[derive(Clone)]
pub struct ApiClient {
    sender: mpsc::Sender<ApiRequest>,
    error_hook: Option<ErrorHook>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("closed", &self.sender.is_closed())
            .field("error_hook", &self.error_hook.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(sender: mpsc::Sender<ApiRequest>) -> Self {
        Self {
            sender,
            error_hook: None,
        }
    }

    /// Installs a global error callback, the equivalent of a response interceptor.
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.error_hook = Some(hook);
        self
    }

    /// Sends a call and returns the raw reply. Non-2xx replies become [`ApiError::Server`].
    pub async fn send(&self, call: ApiCall) -> Result<RawResponse, ApiError> {
        let label = call.to_string();
        let result = self.exchange(call).await;
        if let Err(e) = &result {
            if e.is_cancelled() {
                debug!(call = %label, "Cancelled");
            } else {
                warn!(call = %label, error = %e, "Request failed");
                if let Some(hook) = &self.error_hook {
                    hook(e);
                }
            }
        }
        result
    }

    async fn exchange(&self, call: ApiCall) -> Result<RawResponse, ApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ApiRequest { call, respond_to })
            .await
            .map_err(|_| ApiError::TransportClosed)?;
        let raw = response.await.map_err(|_| ApiError::TransportDropped)??;
        if raw.is_success() {
            Ok(raw)
        } else {
            Err(ApiError::from_response(raw.status, &raw.body))
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        query: Query,
    ) -> Result<ApiResponse<T>, ApiError> {
        let raw = self
            .send(ApiCall::Get {
                path: path.into(),
                query,
            })
            .await?;
        decode_response(&raw)
    }

    pub async fn post<B, T>(&self, path: impl Into<String>, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_with(path, Query::new(), Some(body)).await
    }

    /// POST with query parameters and an optional JSON body.
    pub async fn post_with<B, T>(
        &self,
        path: impl Into<String>,
        query: Query,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body.map(encode_body).transpose()?;
        let raw = self
            .send(ApiCall::Post {
                path: path.into(),
                query,
                body,
            })
            .await?;
        decode_response(&raw)
    }

    pub async fn put<B, T>(&self, path: impl Into<String>, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let raw = self
            .send(ApiCall::Put {
                path: path.into(),
                body: encode_body(body)?,
            })
            .await?;
        decode_response(&raw)
    }

    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        file: MultipartFile,
    ) -> Result<ApiResponse<T>, ApiError> {
        let raw = self
            .send(ApiCall::Upload {
                path: path.into(),
                file,
            })
            .await?;
        decode_response(&raw)
    }

    pub async fn download(
        &self,
        path: impl Into<String>,
        query: Query,
    ) -> Result<ApiResponse<Blob>, ApiError> {
        let raw = self
            .send(ApiCall::Download {
                path: path.into(),
                query,
            })
            .await?;
        Ok(ApiResponse {
            status: raw.status,
            data: Blob::from_raw(raw),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

fn decode_response<T: DeserializeOwned>(raw: &RawResponse) -> Result<ApiResponse<T>, ApiError> {
    Ok(ApiResponse {
        status: raw.status,
        data: raw.decode()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_request};
    use serde_json::json;

    #[tokio::test]
    async fn test_client_sends_calls_to_transport() {
        let (client, mut receiver) = create_mock_client(4);

        let task = tokio::spawn(async move {
            client
                .get::<Value>("/inventory/stock", Query::new().push("location_id", 2))
                .await
        });

        let request = expect_request(&mut receiver).await.expect("Expected a request");
        assert_eq!(request.call.method(), "GET");
        assert_eq!(request.call.path(), "/inventory/stock");
        assert_eq!(request.call.query().and_then(|q| q.get("location_id")), Some("2"));
        request
            .respond_to
            .send(Ok(RawResponse::json(200, &json!([{"item_id": 1}]))))
            .unwrap();

        let response = task.await.unwrap().unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.data, json!([{"item_id": 1}]));
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_server_error() {
        let (client, mut receiver) = create_mock_client(4);
        let task = tokio::spawn(async move { client.post::<_, Value>("/inventory/grn/4/post", &json!({})).await });

        let request = expect_request(&mut receiver).await.unwrap();
        request
            .respond_to
            .send(Ok(RawResponse::json(409, &json!({"detail": "GRN already posted"}))))
            .unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 409,
                message: "GRN already posted".into()
            }
        );
    }

    #[tokio::test]
    async fn test_error_hook_skips_cancellations() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let (client, mut receiver) = create_mock_client(4);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let client = client.with_error_hook(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let c = client.clone();
        let first = tokio::spawn(async move { c.get::<Value>("/a", Query::new()).await });
        let request = expect_request(&mut receiver).await.unwrap();
        request.respond_to.send(Err(ApiError::Cancelled)).unwrap();
        assert_eq!(first.await.unwrap(), Err(ApiError::Cancelled));

        let second = tokio::spawn(async move { client.get::<Value>("/b", Query::new()).await });
        let request = expect_request(&mut receiver).await.unwrap();
        request
            .respond_to
            .send(Ok(RawResponse::json(500, &json!({"message": "boom"}))))
            .unwrap();
        assert!(second.await.unwrap().is_err());

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closed_transport() {
        let (client, receiver) = create_mock_client(1);
        drop(receiver);
        let err = client.get::<Value>("/inventory/items", Query::new()).await.unwrap_err();
        assert_eq!(err, ApiError::TransportClosed);
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        let raw = RawResponse::binary("application/json", Bytes::new());
        let unit: () = raw.decode().unwrap();
        assert_eq!(unit, ());
        let maybe: Option<Value> = raw.decode().unwrap();
        assert!(maybe.is_none());
    }
}
