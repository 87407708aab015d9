//! Error types for the Neon API client.
//!
//! # Design
//! `ApiError` is the structured failure reported by the API itself (or
//! synthesized to look like one): an HTTP status plus the `{code, message}`
//! body. Everything else that can go wrong around a call (bad configuration,
//! unserializable payload, network failure, malformed success body) gets its
//! own `Error` variant so callers can tell them apart without string
//! matching. No retry classification is attached; callers inspect the status.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::HttpResponse;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when a not-found condition is synthesized.
pub const NOT_FOUND_MESSAGE: &str = "object not found";

/// Structured error returned by the API for non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[HTTP Code: {http_code}][Error Code: {code}] {message}")]
pub struct ApiError {
    pub http_code: u16,
    pub code: String,
    pub message: String,
}

/// Wire shape of an error body.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl ApiError {
    pub fn new(http_code: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            http_code,
            code: code.into(),
            message: message.into(),
        }
    }

    /// The 404 produced by the mock transport and the short-body workaround.
    pub fn not_found() -> Self {
        Self::new(404, "", NOT_FOUND_MESSAGE)
    }

    /// Decode a non-2xx response into an `ApiError`.
    ///
    /// The status code is always preserved. An empty body yields
    /// "cannot read response"; a body that is not the JSON error shape yields
    /// a parser-failure message.
    pub fn from_response(response: &HttpResponse) -> Self {
        if response.body.is_empty() {
            return Self::new(response.status, "", "cannot read response");
        }
        match serde_json::from_str::<ErrorBody>(&response.body) {
            Ok(body) => Self::new(response.status, body.code, body.message),
            Err(e) => Self::new(response.status, "", format!("cannot parse response: {e}")),
        }
    }

    /// Render the `{"code":..,"message":..}` body for this error.
    pub fn to_body(&self) -> String {
        serde_json::json!({ "code": self.code, "message": self.message }).to_string()
    }

    pub fn is_not_found(&self) -> bool {
        self.http_code == 404
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_code)
    }

    pub fn is_server_error(&self) -> bool {
        self.http_code >= 500
    }
}

/// Broad category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Other,
}

/// No response was received from the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

/// Errors returned by `NeonClient`.
#[derive(Debug, Error)]
pub enum Error {
    /// The client could not be constructed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A path parameter was empty; no request was sent.
    #[error("path parameter `{0}` must not be empty")]
    EmptyParameter(&'static str),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API reported an error, or a not-found was detected.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl Error {
    /// The structured API error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status of the structured API error, if this is one.
    pub fn http_code(&self) -> Option<u16> {
        self.api_error().map(|e| e.http_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_renders_status_code_and_message() {
        let err = ApiError::new(403, "FORBIDDEN", "authorization failed");
        assert_eq!(
            err.to_string(),
            "[HTTP Code: 403][Error Code: FORBIDDEN] authorization failed"
        );
    }

    #[test]
    fn from_response_decodes_body() {
        let resp = HttpResponse::new(500, r#"{"message":"internal error","code":""}"#);
        let err = ApiError::from_response(&resp);
        assert_eq!(err, ApiError::new(500, "", "internal error"));
    }

    #[test]
    fn from_response_tolerates_missing_fields() {
        let resp = HttpResponse::new(409, r#"{"message":"project already exists"}"#);
        let err = ApiError::from_response(&resp);
        assert_eq!(err.http_code, 409);
        assert_eq!(err.code, "");
        assert_eq!(err.message, "project already exists");
    }

    #[test]
    fn from_response_with_empty_body_keeps_status() {
        let err = ApiError::from_response(&HttpResponse::new(502, ""));
        assert_eq!(err.http_code, 502);
        assert_eq!(err.message, "cannot read response");
    }

    #[test]
    fn from_response_with_non_json_body_keeps_status() {
        let err = ApiError::from_response(&HttpResponse::new(503, "<html>bad gateway</html>"));
        assert_eq!(err.http_code, 503);
        assert!(err.message.starts_with("cannot parse response"), "{}", err.message);
    }

    #[test]
    fn to_body_round_trips_through_from_response() {
        let err = ApiError::new(422, "INVALID", "name is required");
        let back = ApiError::from_response(&HttpResponse::new(422, err.to_body()));
        assert_eq!(back, err);
    }

    #[test]
    fn status_predicates() {
        assert!(ApiError::not_found().is_not_found());
        assert!(ApiError::not_found().is_client_error());
        assert!(ApiError::new(500, "", "").is_server_error());
        assert!(!ApiError::new(500, "", "").is_client_error());
    }

    #[test]
    fn error_exposes_api_error() {
        let err = Error::from(ApiError::not_found());
        assert_eq!(err.http_code(), Some(404));
        assert_eq!(err.to_string(), "[HTTP Code: 404][Error Code: ] object not found");

        let err = Error::Config("missing token".to_string());
        assert!(err.api_error().is_none());
    }
}
