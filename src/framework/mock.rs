//! # Mock Transport
//!
//! Utilities for testing clients, views and workflows without a server.
//!
//! [`MockTransport`] answers requests from an ordered queue of expectations and
//! records every call it receives. For tests that need to inspect or hold a
//! request before answering, [`create_mock_client`] hands back the raw receiver.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::framework::{ApiCall, ApiClient, ApiError, ApiRequest, RawResponse};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

struct Expectation {
    method: &'static str,
    path: String,
    response: Result<RawResponse, ApiError>,
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    received: Vec<ApiCall>,
    mismatches: Vec<String>,
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A transport that replays canned responses in order.
///
/// # Example
/// ```ignore
/// let mut mock = MockTransport::new();
/// mock.expect_get("/inventory/locations").return_json(json!([{"id": 1, "code": "MAIN", "name": "Main Store"}]));
///
/// let locations = LocationClient::new(mock.client());
/// // Use the client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockTransport {
    client: ApiClient,
    state: Arc<Mutex<MockState>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockTransport {
    /// Creates a new mock transport with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ApiRequest>(100);
        let state = Arc::new(Mutex::new(MockState::default()));
        let shared = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(ApiRequest { call, respond_to }) = receiver.recv().await {
                let mut state = lock(&shared);
                state.received.push(call.clone());
                let response = match state.expectations.pop_front() {
                    Some(exp) if exp.method == call.method() && exp.path == call.path() => exp.response,
                    Some(exp) => {
                        let msg = format!("expected {} {}, got {}", exp.method, exp.path, call);
                        state.mismatches.push(msg.clone());
                        Err(ApiError::Transport(msg))
                    }
                    None => {
                        let msg = format!("unexpected request {call}");
                        state.mismatches.push(msg.clone());
                        Err(ApiError::Transport(msg))
                    }
                };
                drop(state);
                let _ = respond_to.send(response);
            }
        });

        Self {
            client: ApiClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// Returns a client wired to this transport.
    pub fn client(&self) -> ApiClient {
        self.client.clone()
    }

    pub fn expect_get(&mut self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect("GET", path)
    }

    pub fn expect_post(&mut self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect("POST", path)
    }

    pub fn expect_put(&mut self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect("PUT", path)
    }

    fn expect(&mut self, method: &'static str, path: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            method,
            path: path.into(),
            state: self.state.clone(),
        }
    }

    /// Every call received so far, in order.
    pub fn requests(&self) -> Vec<ApiCall> {
        lock(&self.state).received.clone()
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let state = lock(&self.state);
        if !state.mismatches.is_empty() {
            panic!("Unexpected requests: {:?}", state.mismatches);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder that completes one expectation.
pub struct ExpectationBuilder {
    method: &'static str,
    path: String,
    state: Arc<Mutex<MockState>>,
}

impl ExpectationBuilder {
    /// Responds with `200` and a JSON body.
    pub fn return_json(self, value: Value) {
        self.respond(Ok(RawResponse::json(200, &value)));
    }

    /// Responds with an arbitrary status and JSON body.
    pub fn return_status(self, status: u16, value: Value) {
        self.respond(Ok(RawResponse::json(status, &value)));
    }

    /// Responds with a binary body.
    pub fn return_blob(self, content_type: &str, bytes: impl Into<Bytes>) {
        self.respond(Ok(RawResponse::binary(content_type, bytes)));
    }

    /// Fails at the transport level.
    pub fn return_err(self, error: ApiError) {
        self.respond(Err(error));
    }

    fn respond(self, response: Result<RawResponse, ApiError>) {
        lock(&self.state).expectations.push_back(Expectation {
            method: self.method,
            path: self.path,
            response,
        });
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// Use this when a test needs to hold a request open (to simulate a slow or
/// out-of-order reply) or inspect it before answering.
pub fn create_mock_client(buffer_size: usize) -> (ApiClient, mpsc::Receiver<ApiRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ApiClient::new(sender), receiver)
}

/// Waits for the next request on a raw mock channel.
pub async fn expect_request(receiver: &mut mpsc::Receiver<ApiRequest>) -> Option<ApiRequest> {
    receiver.recv().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Query;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_transport_with_expectations() {
        let mut mock = MockTransport::new();
        mock.expect_get("/inventory/locations")
            .return_json(json!([{"id": 1, "code": "MAIN"}]));
        mock.expect_post("/inventory/locations")
            .return_status(422, json!({"detail": "code is required"}));

        let client = mock.client();
        let listed = client
            .get::<Value>("/inventory/locations", Query::new())
            .await
            .unwrap();
        assert_eq!(listed.data[0]["code"], "MAIN");

        let err = client
            .post::<_, Value>("/inventory/locations", &json!({"name": "Ward"}))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "code is required");

        assert_eq!(mock.requests().len(), 2);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected requests")]
    async fn test_unexpected_request_fails_verify() {
        let mock = MockTransport::new();
        let _ = mock.client().get::<Value>("/inventory/items", Query::new()).await;
        mock.verify();
    }
}
