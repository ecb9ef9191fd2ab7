//! Shared fixtures for the crate's tests.

use crate::ShipmentClient;
use chrono::{Duration, Utc};
use melhor_envio_auth::Session;
use melhor_envio_core::{AppIdentity, Credentials, SessionConfig};
use std::sync::Arc;
use wiremock::matchers::header;
use wiremock::MockServer;

pub(crate) const ACCESS_TOKEN: &str = "access-0";

pub(crate) fn client_for(server: &MockServer) -> ShipmentClient {
    let credentials = Credentials::new(1234, "secret")
        .with_refresh_token("refresh-0")
        .with_access_token(ACCESS_TOKEN, Utc::now() + Duration::hours(1));
    let config = SessionConfig::new(credentials, AppIdentity::new("Loja Teste", "dev@example.com"))
        .with_base_url(server.uri());
    ShipmentClient::new(Arc::new(Session::new(config).unwrap()))
}

pub(crate) fn bearer() -> wiremock::matchers::HeaderExactMatcher {
    header("authorization", "Bearer access-0")
}

pub(crate) fn rejection(message: &str, field: &str, detail: &str) -> serde_json::Value {
    serde_json::json!({
        "message": message,
        "errors": { field: [detail] }
    })
}
