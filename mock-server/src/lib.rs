//! HTTP front for the fixture table.
//!
//! Every request is handed to `neon_core::MockTransport`, so the server
//! answers exactly like the in-process mock: same templates, same reserved
//! tokens and ids, same error bodies. Useful for driving the real network
//! transport end-to-end.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use neon_core::{ApiError, Fixtures, HttpMethod, HttpRequest, MockTransport};
use tokio::net::TcpListener;

pub fn app(fixtures: Arc<Fixtures>) -> Router {
    Router::new()
        .fallback(handle)
        .with_state(Arc::new(MockTransport::new(fixtures)))
}

/// Serve the fixtures bundled with `neon-core`.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let fixtures = Fixtures::bundled().map_err(std::io::Error::other)?;
    axum::serve(listener, app(Arc::new(fixtures))).await
}

async fn handle(
    State(mock): State<Arc<MockTransport>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Ok(method) = method.as_str().parse::<HttpMethod>() else {
        let err = ApiError::new(405, "", format!("method {method} not supported"));
        return json_response(err.http_code, err.to_body());
    };

    let request = HttpRequest {
        method,
        url: uri.to_string(),
        headers: headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect(),
        body: (!body.is_empty()).then(|| String::from_utf8_lossy(&body).into_owned()),
    };

    let response = mock.respond(&request);
    tracing::debug!(
        method = %request.method,
        path = request.path(),
        status = response.status,
        "fixture request"
    );
    json_response(response.status, response.body)
}

fn json_response(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_response_sets_status_and_content_type() {
        let resp = json_response(201, "{}".to_string());
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn out_of_range_status_becomes_500() {
        let resp = json_response(1000, "{}".to_string());
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
