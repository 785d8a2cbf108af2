//! Common test utilities shared across all integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use secure_redact::Client;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "clientId";
pub const CLIENT_SECRET: &str = "clientSecret";

/// `base64("clientId:clientSecret")` with the Basic prefix.
pub const BASIC_TOKEN: &str = "Basic Y2xpZW50SWQ6Y2xpZW50U2VjcmV0";

/// The bearer header every authenticated request should carry after a
/// successful token fetch.
#[allow(dead_code)]
pub const BEARER_TOKEN: &str = "Bearer dummy.jwt.token";

/// Mounts the token endpoint: 200 with a dummy token for the right Basic
/// credential, 403 for anything else.
pub async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2/token"))
        .and(header("authorization", BASIC_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": null,
            "token": "dummy.jwt.token",
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/token"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(serde_json::json!({ "error": "Forbidden" })),
        )
        .mount(server)
        .await;
}

/// Creates a client with the well-known test credentials, pointed at the
/// mock server.
pub fn client_for(server: &MockServer) -> Client {
    Client::builder(CLIENT_ID, CLIENT_SECRET)
        .base_url(server.uri())
        .build()
        .unwrap()
}

/// Number of requests the server has received on the given path.
pub async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

/// Number of token-endpoint hits.
pub async fn token_hits(server: &MockServer) -> usize {
    hits(server, "/api/v2/token").await
}
