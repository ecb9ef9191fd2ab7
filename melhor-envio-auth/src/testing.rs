//! Shared fixtures for the crate's tests.

use crate::Session;
use async_trait::async_trait;
use melhor_envio_core::{AppIdentity, CredentialSink, Credentials, SessionConfig};
use mockall::mock;
use std::sync::Arc;
use wiremock::MockServer;

mock! {
    pub Sink {}

    #[async_trait]
    impl CredentialSink for Sink {
        async fn credentials_changed(&self, credentials: &Credentials) -> anyhow::Result<()>;
    }
}

pub(crate) fn config_for(base_url: &str) -> SessionConfig {
    SessionConfig::new(
        Credentials::new(1234, "secret"),
        AppIdentity::new("Loja Teste", "dev@example.com"),
    )
    .with_base_url(base_url)
    .with_redirect_uri("https://loja.example.com/callback")
}

pub(crate) fn session_for(server: &MockServer, credentials: Credentials) -> Session {
    let mut config = config_for(&server.uri());
    config.credentials = credentials;
    Session::new(config).unwrap()
}

pub(crate) fn session_with_sink(
    server: &MockServer,
    credentials: Credentials,
    sink: Arc<dyn CredentialSink>,
) -> Session {
    let mut config = config_for(&server.uri()).with_sink(sink);
    config.credentials = credentials;
    Session::new(config).unwrap()
}

pub(crate) fn token_body(access: &str, refresh: &str, expires_in: i64) -> serde_json::Value {
    serde_json::json!({
        "token_type": "Bearer",
        "expires_in": expires_in,
        "access_token": access,
        "refresh_token": refresh
    })
}
