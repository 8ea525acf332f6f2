//! Shared test utilities for integration tests.
//!
//! A `wiremock` server stands in for the platform, mounted under the same
//! `/api/v2` root the real API uses.

#![allow(dead_code)]

use atlas_api::AtlasClient;
use atlas_core::config::ApiConfig;
use serde_json::{json, Value};
use wiremock::{MockServer, Request, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const CLIENT_NAME: &str = "itest";

/// Build a client pointed at the mock server.
pub fn client_for(server: &MockServer) -> AtlasClient {
    client_with_timeout(server, 2_000)
}

/// Build a client with a specific timeout.
pub fn client_with_timeout(server: &MockServer, timeout_ms: u64) -> AtlasClient {
    let config = ApiConfig {
        base_url: format!("{}/api/v2", server.uri()),
        api_key: API_KEY.into(),
        client_name: CLIENT_NAME.into(),
        timeout_ms,
    };
    AtlasClient::new(&config).expect("failed to build client")
}

/// A probe list page containing one minimal record per id.
pub fn probe_page(ids: impl IntoIterator<Item = u64>, next: Option<&str>) -> Value {
    let results: Vec<Value> = ids
        .into_iter()
        .map(|id| json!({"id": id, "country_code": "NL", "status": {"id": 1, "name": "Connected"}}))
        .collect();
    json!({
        "count": results.len(),
        "next": next,
        "previous": null,
        "results": results,
    })
}

/// Responder that answers an `id__in` lookup with exactly the requested ids.
pub fn echo_id_in(
    next: Option<&'static str>,
) -> impl Fn(&Request) -> ResponseTemplate + Send + Sync + 'static {
    move |req: &Request| {
        let ids: Vec<u64> = query_value(req, "id__in")
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse().expect("id__in should hold integers"))
            .collect();
        ResponseTemplate::new(200).set_body_json(probe_page(ids, next))
    }
}

/// Value of a query parameter on a received request.
pub fn query_value(req: &Request, key: &str) -> Option<String> {
    req.url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Every request the mock server has seen.
pub async fn received(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording should be enabled")
}

/// Value of a header on a received request.
pub fn header_value(req: &Request, name: &str) -> Option<Vec<u8>> {
    req.headers.get(name).map(|v| v.as_bytes().to_vec())
}
