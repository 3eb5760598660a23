//! # Client Errors
//!
//! Every request made through [`ApiClient`](crate::framework::ApiClient) fails with an
//! [`ApiError`]. The variants follow how the backend and the transport actually fail:
//!
//! - **Validation**: caught before anything is sent.
//! - **Server**: the backend answered with a non-2xx status. The message is pulled out
//!   of the backend's error envelope.
//! - **Cancelled**: a superseded or aborted request. Never shown to users.
//! - **Transport / Decode / Encode**: network and payload problems.

use serde_json::Value;
use thiserror::Error;

/// Message used when neither the body nor the status gives anything better.
pub const FALLBACK_MESSAGE: &str = "Request failed";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Client-side presence or format check failed. No request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server rejected the request.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Could not encode request: {0}")]
    Encode(String),

    /// Aborted or superseded by a newer request.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Transport closed")]
    TransportClosed,

    #[error("Transport dropped response channel")]
    TransportDropped,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Builds a server error from a non-2xx response body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        ApiError::Server {
            status,
            message: extract_error_message(status, body),
        }
    }

    /// Classifies a `reqwest` failure. Always a transport error: a cancelled call
    /// never gets here, its reply channel is dropped instead.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::Transport("request timed out".to_string());
        }
        ApiError::Transport(err.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }

    /// HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for showing to staff.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Transport(_) | ApiError::TransportClosed | ApiError::TransportDropped => {
                "Could not reach the server. Check the connection and try again.".to_string()
            }
            ApiError::Decode(_) | ApiError::Encode(_) => FALLBACK_MESSAGE.to_string(),
            ApiError::Cancelled => String::new(),
        }
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Lookup order: `error.msg`, `message`, `detail` (a string, or the first `msg` of a
/// validation list), a string `error`, then a generic status line.
pub fn extract_error_message(status: u16, body: &[u8]) -> String {
    let generic = if status == 0 {
        FALLBACK_MESSAGE.to_string()
    } else {
        format!("Request failed with status code {status}")
    };

    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        // Plain-text bodies are used as-is, HTML error pages are not.
        if !text.is_empty() && !text.starts_with('<') && text.len() <= 500 {
            return text.to_string();
        }
        return generic;
    };

    let candidates = [
        value.pointer("/error/msg").and_then(Value::as_str),
        value.get("message").and_then(Value::as_str),
        value.get("detail").and_then(Value::as_str),
        value.pointer("/detail/0/msg").and_then(Value::as_str),
        value.get("error").and_then(Value::as_str),
    ];

    let message = candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
        .unwrap_or(generic);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_precedence() {
        let body = br#"{"error":{"msg":"Batch expired"},"message":"ignored"}"#;
        assert_eq!(extract_error_message(400, body), "Batch expired");

        let body = br#"{"message":"Supplier code already exists"}"#;
        assert_eq!(extract_error_message(409, body), "Supplier code already exists");

        let body = br#"{"detail":"Insufficient stock in batch B-12"}"#;
        assert_eq!(extract_error_message(422, body), "Insufficient stock in batch B-12");

        let body = br#"{"detail":[{"loc":["body","qty"],"msg":"qty must be positive"}]}"#;
        assert_eq!(extract_error_message(422, body), "qty must be positive");
    }

    #[test]
    fn test_error_fallbacks() {
        assert_eq!(
            extract_error_message(500, br#"{"unexpected":true}"#),
            "Request failed with status code 500"
        );
        assert_eq!(
            extract_error_message(502, b"<html>Bad gateway</html>"),
            "Request failed with status code 502"
        );
        assert_eq!(extract_error_message(503, b"Maintenance window"), "Maintenance window");
        assert_eq!(extract_error_message(0, b""), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_cancellation_is_not_user_facing() {
        assert!(ApiError::Cancelled.is_cancelled());
        assert_eq!(ApiError::Cancelled.user_message(), "");
    }

    #[test]
    fn test_transport_failure_is_never_a_cancellation() {
        let err = ApiError::Transport(
            "error sending request for url (http://127.0.0.1:1/api/pharmacy/prescriptions/41/cancel)".into(),
        );
        assert!(!err.is_cancelled());
        assert!(!ApiError::Transport("operation was aborted".into()).is_cancelled());
        assert!(!err.user_message().is_empty());
    }

    #[test]
    fn test_server_error_status() {
        let err = ApiError::from_response(404, br#"{"message":"Item not found"}"#);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Item not found");
        assert_eq!(err.user_message(), "Item not found");
    }
}
