//! Network-free transport that answers from a fixture table.
//!
//! # Design
//! `Fixtures` is an immutable map from path template and method to a canned
//! response. It is built once (usually from the document bundled with the
//! crate) and shared by `Arc`; nothing mutates it afterwards. `MockTransport`
//! turns a concrete request path back into its template, then answers with
//! the matching fixture or with one of the synthesized errors below.
//!
//! Reserved inputs:
//! - bearer token `invalidApiKey` -> 403 on every endpoint;
//! - an id segment equal to `notFound`, `missing`, `false`, or a negative
//!   integer -> 404, whatever the fixture says.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Path prefix of the public API, stripped before matching templates.
pub const API_ROOT: &str = "/api/v2";

/// Bearer token that makes every call fail authorization.
pub const INVALID_TOKEN: &str = "invalidApiKey";

/// Id values that make the mock report the object as missing.
pub const NOT_FOUND_SENTINELS: &[&str] = &["notFound", "missing", "false"];

const BUNDLED_FIXTURES: &str = include_str!("../fixtures/endpoints.json");

/// One canned response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fixture {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Canned responses keyed by path template, then by upper-case method.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Fixtures {
    endpoints: BTreeMap<String, BTreeMap<String, Fixture>>,
}

impl Fixtures {
    /// The fixture document compiled into this crate.
    pub fn bundled() -> serde_json::Result<Self> {
        Self::from_json(BUNDLED_FIXTURES)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn get(&self, template: &str, method: &str) -> Option<&Fixture> {
        self.endpoints.get(template)?.get(method)
    }

    pub fn contains(&self, template: &str) -> bool {
        self.endpoints.contains_key(template)
    }

    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    pub fn methods(&self, template: &str) -> impl Iterator<Item = &str> {
        self.endpoints
            .get(template)
            .into_iter()
            .flat_map(|m| m.keys().map(String::as_str))
    }
}

/// A request path reduced to its template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    pub template: String,
    /// An id segment was a not-found sentinel.
    pub not_found: bool,
}

/// Reduce a concrete path to its template, e.g.
/// `/api/v2/projects/p1/branches/br-1` -> `/projects/{project_id}/branches/{branch_id}`.
///
/// Segments alternate between collection names and ids. Ids are replaced by a
/// placeholder derived from the preceding collection name.
pub fn normalize_path(path: &str) -> NormalizedPath {
    let path = match path.strip_prefix(API_ROOT) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut template = String::new();
    let mut not_found = false;
    for (i, segment) in segments.iter().enumerate() {
        template.push('/');
        if i % 2 == 0 {
            template.push_str(segment);
            continue;
        }
        let collection = segments[i - 1];
        if collection == "users" && *segment == "me" {
            template.push_str(segment);
            continue;
        }
        not_found |= is_not_found_sentinel(segment);
        template.push('{');
        template.push_str(&placeholder(collection));
        template.push('}');
    }
    if template.is_empty() {
        template.push('/');
    }

    NormalizedPath {
        template,
        not_found,
    }
}

fn placeholder(collection: &str) -> String {
    match collection {
        "databases" => "database_name".to_string(),
        "roles" => "role_name".to_string(),
        "branches" => "branch_id".to_string(),
        "api_keys" => "key_id".to_string(),
        other => format!("{}_id", other.strip_suffix('s').unwrap_or(other)),
    }
}

fn is_not_found_sentinel(segment: &str) -> bool {
    NOT_FOUND_SENTINELS.contains(&segment)
        || segment.parse::<i64>().map(|n| n < 0).unwrap_or(false)
}

#[derive(Debug, Clone)]
enum Responses {
    Table(Arc<Fixtures>),
    Fixed(HttpResponse),
}

/// Deterministic stand-in for the network.
#[derive(Debug, Clone)]
pub struct MockTransport {
    responses: Responses,
}

impl MockTransport {
    pub fn new(fixtures: Arc<Fixtures>) -> Self {
        Self {
            responses: Responses::Table(fixtures),
        }
    }

    /// Answer every request with `status` and `body`.
    pub fn with_response(status: u16, body: impl Into<String>) -> Self {
        Self {
            responses: Responses::Fixed(HttpResponse::new(status, body)),
        }
    }

    /// Compute the response for `request`. Never fails.
    pub fn respond(&self, request: &HttpRequest) -> HttpResponse {
        let expected = format!("Bearer {INVALID_TOKEN}");
        if request.header("Authorization") == Some(expected.as_str()) {
            return error_response(ApiError::new(403, "", "authorization failed"));
        }

        let fixtures = match &self.responses {
            Responses::Fixed(response) => return response.clone(),
            Responses::Table(fixtures) => fixtures,
        };

        let path = normalize_path(request.path());
        if !fixtures.contains(&path.template) {
            return error_response(ApiError::new(
                400,
                "",
                format!("unknown endpoint {}", path.template),
            ));
        }
        let method = request.method.as_str();
        let Some(fixture) = fixtures.get(&path.template, method) else {
            return error_response(ApiError::new(
                405,
                "",
                format!("method {method} not allowed for endpoint {}", path.template),
            ));
        };
        if path.not_found {
            return error_response(ApiError::not_found());
        }
        HttpResponse::new(fixture.status, fixture.body.to_string())
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(self.respond(request))
    }

    fn is_mock(&self) -> bool {
        true
    }
}

fn error_response(err: ApiError) -> HttpResponse {
    HttpResponse::new(err.http_code, err.to_body())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn request(method: HttpMethod, path: &str, token: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("http://localhost{path}"),
            headers: vec![("Authorization".to_string(), format!("Bearer {token}"))],
            body: None,
        }
    }

    fn transport() -> MockTransport {
        MockTransport::new(Arc::new(Fixtures::bundled().unwrap()))
    }

    #[test]
    fn normalizes_nested_resources() {
        let p = normalize_path("/api/v2/projects/quiet-river-711967/branches/br-wispy-1/roles/alex");
        assert_eq!(p.template, "/projects/{project_id}/branches/{branch_id}/roles/{role_name}");
        assert!(!p.not_found);

        let p = normalize_path("/projects/p/branches/b/databases/neondb");
        assert_eq!(p.template, "/projects/{project_id}/branches/{branch_id}/databases/{database_name}");
    }

    #[test]
    fn keeps_action_suffix_and_users_me() {
        let p = normalize_path("/api/v2/projects/p/endpoints/ep-1/start");
        assert_eq!(p.template, "/projects/{project_id}/endpoints/{endpoint_id}/start");
        assert_eq!(normalize_path("/api/v2/users/me").template, "/users/me");
        assert_eq!(normalize_path("/api_keys/42").template, "/api_keys/{key_id}");
        assert_eq!(normalize_path("/api/v2").template, "/");
    }

    #[test]
    fn api_root_must_be_a_whole_segment() {
        assert_eq!(normalize_path("/api/v2x/projects").template, "/api/{api_id}/projects");
    }

    #[test]
    fn flags_not_found_sentinels() {
        for id in ["notFound", "missing", "false", "-1", "-42"] {
            let p = normalize_path(&format!("/projects/{id}"));
            assert!(p.not_found, "{id}");
            assert_eq!(p.template, "/projects/{project_id}");
        }
        assert!(!normalize_path("/projects/0").not_found);
        assert!(!normalize_path("/projects/-abc").not_found);
    }

    #[test]
    fn bundled_fixtures_are_keyed_by_normalized_templates() {
        let fixtures = Fixtures::bundled().unwrap();
        for template in fixtures.templates() {
            assert_eq!(normalize_path(template).template, template);
            assert!(fixtures.methods(template).count() > 0, "{template}");
        }
    }

    #[test]
    fn invalid_token_yields_403_everywhere() {
        let t = transport();
        for path in ["/api/v2/projects", "/api/v2/does/not/exist"] {
            let resp = t.respond(&request(HttpMethod::Get, path, INVALID_TOKEN));
            assert_eq!(resp.status, 403);
            let err = ApiError::from_response(&resp);
            assert_eq!(err.message, "authorization failed");
        }
    }

    #[test]
    fn unknown_endpoint_is_bad_request() {
        let resp = transport().respond(&request(HttpMethod::Get, "/api/v2/widgets", "ok"));
        assert_eq!(resp.status, 400);
        assert_eq!(ApiError::from_response(&resp).message, "unknown endpoint /widgets");
    }

    #[test]
    fn unsupported_method_is_not_allowed() {
        let resp = transport().respond(&request(HttpMethod::Put, "/api/v2/projects", "ok"));
        assert_eq!(resp.status, 405);
        assert_eq!(
            ApiError::from_response(&resp).message,
            "method PUT not allowed for endpoint /projects"
        );
    }

    #[test]
    fn sentinel_id_yields_404() {
        let resp = transport().respond(&request(HttpMethod::Get, "/api/v2/projects/notFound", "ok"));
        assert_eq!(resp.status, 404);
        assert_eq!(ApiError::from_response(&resp), ApiError::not_found());
    }

    #[test]
    fn known_endpoint_returns_fixture_verbatim() {
        let fixtures = Fixtures::bundled().unwrap();
        let fixture = fixtures.get("/projects/{project_id}", "GET").unwrap().clone();
        let resp = transport().respond(&request(HttpMethod::Get, "/api/v2/projects/anything", "ok"));
        assert_eq!(resp.status, fixture.status);
        let body: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(body, fixture.body);
    }

    #[test]
    fn fixed_response_double_still_checks_token() {
        let t = MockTransport::with_response(500, r#"{"message":"internal error","code":""}"#);
        assert_eq!(t.respond(&request(HttpMethod::Post, "/any", "ok")).status, 500);
        assert_eq!(t.respond(&request(HttpMethod::Post, "/any", INVALID_TOKEN)).status, 403);
        assert!(t.is_mock());
    }

    #[test]
    fn from_json_rejects_malformed_documents() {
        assert!(Fixtures::from_json(r#"{"/projects": {"GET": {"status": "x"}}}"#).is_err());
        let empty = Fixtures::from_json("{}").unwrap();
        assert_eq!(empty.templates().count(), 0);
    }
}
