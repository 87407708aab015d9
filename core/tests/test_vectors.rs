//! Verify `build_request` / `parse_response` against JSON test vectors stored
//! in `test-vectors/`.
//!
//! Each case describes a call, the request the client should build, a
//! simulated response, and the expected outcome. Comparing parsed JSON (not
//! raw strings) avoids false negatives from field ordering.

use std::sync::Arc;

use neon_core::{Config, Error, HttpMethod, HttpResponse, MockTransport, NeonClient};

const BASE_URL: &str = "http://localhost:3000/api/v2";

fn client() -> NeonClient {
    let config = Config::default()
        .with_token("test-token")
        .with_base_url(BASE_URL)
        .with_transport(Arc::new(MockTransport::with_response(200, "{}")))
        .without_env_fallback();
    NeonClient::new(config).unwrap()
}

#[test]
fn dispatch_test_vectors() {
    let raw = include_str!("../../test-vectors/dispatch.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method: HttpMethod = case["method"].as_str().unwrap().parse().unwrap();
        let path = case["path"].as_str().unwrap();
        let payload = case.get("payload");
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_request(method, path, payload).unwrap();
        assert_eq!(req.method, method, "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["url"].as_str().unwrap()), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match req.body.as_deref() {
            Some(body) => {
                let body: serde_json::Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected_req["body"], "{name}: body");
            }
            None => assert!(expected_req["body"].is_null(), "{name}: body should be None"),
        }

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = c.parse_response::<serde_json::Value>(method, response);

        if let Some(expected) = case.get("expected_api_error") {
            let err = result.unwrap_err();
            let api = err.api_error().unwrap_or_else(|| panic!("{name}: expected api error, got {err:?}"));
            assert_eq!(api.http_code as u64, expected["http_code"].as_u64().unwrap(), "{name}: http code");
            assert_eq!(api.code, expected["code"].as_str().unwrap(), "{name}: code");
            assert_eq!(api.message, expected["message"].as_str().unwrap(), "{name}: message");
        } else if let Some(expected) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected.as_str().unwrap() {
                "Deserialization" => {
                    assert!(matches!(err, Error::Deserialization(_)), "{name}: expected Deserialization")
                }
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let value = result.unwrap();
            assert_eq!(value, case["expected_result"], "{name}: parsed result");
        }
    }
}
