//! Request dispatcher for the Neon API.
//!
//! # Design
//! `NeonClient` holds an immutable configuration (token, base URL, transport)
//! behind an `Arc`, so clones are cheap and can be shared across threads. Each
//! call is split into `build_request` (serialize payload, attach headers) and
//! `parse_response` (classify status, decode body); `execute` runs both with
//! exactly one transport round-trip in between. There are no retries: every
//! failure is handed back to the caller unchanged.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{ApiError, Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};

/// GET responses with a 2xx status and a body shorter than this are treated
/// as not-found. The API has been seen reporting a missing object this way.
// TODO: drop once the API is confirmed to always answer 404 for missing objects.
pub const MIN_GET_BODY_LEN: usize = 5;

/// Placeholder payload for calls without a request body.
pub const NO_PAYLOAD: Option<&()> = None;

/// Synchronous client for the Neon management API.
#[derive(Clone)]
pub struct NeonClient {
    inner: Arc<Inner>,
}

struct Inner {
    base_url: String,
    token: Option<String>,
    transport: Arc<dyn Transport>,
}

impl NeonClient {
    /// Build a client from `config`.
    ///
    /// Fails with [`Error::Config`] when no token can be resolved and the
    /// transport is not a mock. No request is made.
    pub fn new(config: Config) -> Result<Self> {
        let token = config.resolve_token();
        let transport: Arc<dyn Transport> = match config.transport {
            Some(t) => t,
            None => Arc::new(UreqTransport::new()),
        };
        if token.is_none() && !transport.is_mock() {
            return Err(Error::Config(match config.token_env {
                Some(var) => format!("API token is required: set it in the config or via {var}"),
                None => "API token is required".to_string(),
            }));
        }
        Ok(Self {
            inner: Arc::new(Inner {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                token,
                transport,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Build the request for `method` on `path` (relative to the base URL).
    ///
    /// A payload that fails to serialize is reported here, before any
    /// transport is involved.
    pub fn build_request<P>(&self, method: HttpMethod, path: &str, payload: Option<&P>) -> Result<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        let body = payload
            .map(serde_json::to_string)
            .transpose()
            .map_err(Error::Serialization)?;

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        if let Some(token) = &self.inner.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.inner.base_url, path),
            headers,
            body,
        })
    }

    /// Classify `response` and decode its body into `R`.
    pub fn parse_response<R: DeserializeOwned>(&self, method: HttpMethod, response: HttpResponse) -> Result<R> {
        check_status(method, &response)?;
        serde_json::from_str(&response.body).map_err(Error::Deserialization)
    }

    /// Classify `response` without decoding a body.
    pub fn parse_empty(&self, method: HttpMethod, response: HttpResponse) -> Result<()> {
        check_status(method, &response)?;
        Ok(())
    }

    /// One full API call: build, send once, parse.
    pub fn execute<P, R>(&self, method: HttpMethod, path: &str, payload: Option<&P>) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_request(method, path, payload)?;
        let response = self.send(&request)?;
        self.parse_response(method, response)
    }

    /// Like [`NeonClient::execute`] for calls whose response body is ignored.
    pub fn execute_empty<P>(&self, method: HttpMethod, path: &str, payload: Option<&P>) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        let request = self.build_request(method, path, payload)?;
        let response = self.send(&request)?;
        self.parse_empty(method, response)
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let response = self.inner.transport.send(request)?;
        tracing::debug!(
            method = %request.method,
            path = request.path(),
            status = response.status,
            "neon api call"
        );
        tracing::trace!(bytes = response.body.len(), "response body received");
        Ok(response)
    }
}

impl fmt::Debug for NeonClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeonClient")
            .field("base_url", &self.inner.base_url)
            .field("mock", &self.inner.transport.is_mock())
            .finish_non_exhaustive()
    }
}

/// Map a response to `Err(ApiError)` when it does not carry a usable result.
fn check_status(method: HttpMethod, response: &HttpResponse) -> std::result::Result<(), ApiError> {
    if !response.is_success() {
        return Err(ApiError::from_response(response));
    }
    if method == HttpMethod::Get && response.body.len() < MIN_GET_BODY_LEN {
        return Err(ApiError::not_found());
    }
    Ok(())
}
