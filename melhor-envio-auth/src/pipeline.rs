//! Authenticated request pipeline.
//!
//! Requests are described by a [`PreparedRequest`] template rather than a
//! built `reqwest::Request`, so the body is serialized once and can be sent
//! again verbatim when the first attempt is rejected with 401.

use crate::session::Session;
use bytes::Bytes;
use melhor_envio_core::{Error, Result};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// Replayable description of an outbound request.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: Url,
    body: Option<Bytes>,
}

impl PreparedRequest {
    /// Create a request without a body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
        }
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Serialized body, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    fn build(&self, session: &Session, bearer: Option<&str>) -> Result<reqwest::Request> {
        let mut builder = session
            .client
            .request(self.method.clone(), self.url.clone())
            .headers(session.default_headers.clone());
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }
        Ok(builder.build()?)
    }
}

impl Session {
    /// Prepare a request against an API path (starting with `/`).
    pub fn prepare(&self, method: Method, path: &str) -> Result<PreparedRequest> {
        Ok(PreparedRequest::new(method, self.endpoint(path)?))
    }

    /// Send a request with a valid bearer token.
    ///
    /// Refreshes first when the stored token is expired. If the server still
    /// answers 401, refreshes once more and replays the request a single
    /// time. Any other status is returned to the caller for decoding.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] after shutdown, refresh failures unchanged,
    /// transport failures unchanged, and [`Error::InvalidToken`] when the
    /// replay is rejected with 401 too.
    pub async fn execute(&self, request: &PreparedRequest) -> Result<Response> {
        self.ensure_initialized()?;

        let snapshot = self.credentials();
        if snapshot.is_expired() {
            debug!("access token expired, refreshing before request");
            self.refresh_stale(&snapshot.access_token).await?;
        }

        let token = self.access_token();
        debug!(method = %request.method, url = %request.url, attempt = 1, "sending request");
        let response = self.send(request.build(self, Some(&token))?).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!(method = %request.method, url = %request.url, "request unauthorized, re-authenticating");
        drop(response);
        self.refresh_stale(&token).await?;

        let token = self.access_token();
        debug!(method = %request.method, url = %request.url, attempt = 2, "sending request");
        let response = self.send(request.build(self, Some(&token))?).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::InvalidToken);
        }
        Ok(response)
    }

    /// Send a request to a public route: default headers, no bearer token,
    /// no refresh.
    pub async fn execute_public(&self, request: &PreparedRequest) -> Result<Response> {
        self.ensure_initialized()?;
        debug!(method = %request.method, url = %request.url, "sending public request");
        self.send(request.build(self, None)?).await
    }

    fn access_token(&self) -> String {
        self.credentials.read().access_token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{session_for, token_body};
    use crate::token::TOKEN_PATH;
    use chrono::{Duration, Utc};
    use melhor_envio_core::Credentials;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn valid(token: &str) -> Credentials {
        Credentials::new(1234, "secret")
            .with_refresh_token("refresh-0")
            .with_access_token(token, Utc::now() + Duration::hours(1))
    }

    fn expired(token: &str) -> Credentials {
        Credentials::new(1234, "secret")
            .with_refresh_token("refresh-0")
            .with_access_token(token, Utc::now() - Duration::seconds(1))
    }

    async fn mount_token(server: &MockServer, access: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(access, "refresh-1", 3600)))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_execute_attaches_bearer_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/me"))
            .and(header("authorization", "Bearer access-0"))
            .and(header("user-agent", "Loja Teste (dev@example.com)"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "u1"})))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, valid("access-0"));
        let request = session.prepare(Method::GET, "/api/v2/me").unwrap();
        let response = session.execute(&request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_execute_refreshes_expired_token_first() {
        let server = MockServer::start().await;
        mount_token(&server, "access-1", 1).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/me"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, expired("access-0"));
        let request = session.prepare(Method::GET, "/api/v2/me").unwrap();
        session.execute(&request).await.unwrap();

        assert_eq!(session.credentials().access_token, "access-1");
    }

    #[tokio::test]
    async fn test_execute_refresh_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = session_for(&server, expired("access-0"));
        let request = session.prepare(Method::GET, "/api/v2/me").unwrap();

        assert!(matches!(
            session.execute(&request).await,
            Err(Error::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_execute_refresh_failure_after_401_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/me"))
            .and(header("authorization", "Bearer revoked"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, valid("revoked"));
        let request = session.prepare(Method::GET, "/api/v2/me").unwrap();

        assert!(matches!(
            session.execute(&request).await,
            Err(Error::InvalidToken)
        ));
        assert_eq!(session.credentials().access_token, "revoked");
    }

    #[tokio::test]
    async fn test_execute_without_any_token_material() {
        let server = MockServer::start().await;
        let session = session_for(&server, Credentials::new(1234, "secret"));
        let request = session.prepare(Method::GET, "/api/v2/me").unwrap();

        assert!(matches!(
            session.execute(&request).await,
            Err(Error::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_execute_retries_once_after_401_with_same_body() {
        let server = MockServer::start().await;
        mount_token(&server, "access-1", 1).await;
        Mock::given(method("POST"))
            .and(path("/api/v2/me/cart"))
            .and(header("authorization", "Bearer revoked"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/me/cart"))
            .and(header("authorization", "Bearer access-1"))
            .and(body_json(serde_json::json!({"service": 1})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "order-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, valid("revoked"));
        let request = session
            .prepare(Method::POST, "/api/v2/me/cart")
            .unwrap()
            .json(&serde_json::json!({"service": 1}))
            .unwrap();

        let response = session.execute(&request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(session.credentials().access_token, "access-1");
    }

    #[tokio::test]
    async fn test_execute_second_401_is_invalid_token() {
        let server = MockServer::start().await;
        mount_token(&server, "access-1", 1).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/me"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let session = session_for(&server, valid("access-0"));
        let request = session.prepare(Method::GET, "/api/v2/me").unwrap();

        assert!(matches!(
            session.execute(&request).await,
            Err(Error::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_execute_passes_other_statuses_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/me"))
            .respond_with(ResponseTemplate::new(422).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, valid("access-0"));
        let request = session.prepare(Method::GET, "/api/v2/me").unwrap();
        let response = session.execute(&request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_execute_after_shutdown() {
        let server = MockServer::start().await;
        let session = session_for(&server, valid("access-0"));
        let request = session.prepare(Method::GET, "/api/v2/me").unwrap();
        session.shutdown();

        assert!(matches!(
            session.execute(&request).await,
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            session.execute_public(&request).await,
            Err(Error::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_execute_transport_failure_is_not_retried() {
        let server = MockServer::start().await;
        let session = session_for(&server, valid("access-0"));
        let request = PreparedRequest::new(
            Method::GET,
            Url::parse("http://127.0.0.1:9/unreachable").unwrap(),
        );

        assert!(matches!(
            session.execute(&request).await,
            Err(Error::Transport(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_public_omits_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/me/shipment/services/1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, expired("access-0"));
        let request = session
            .prepare(Method::GET, "/api/v2/me/shipment/services/1")
            .unwrap();
        session.execute_public(&request).await.unwrap();

        let received: Vec<Request> = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(!received[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_concurrent_expired_requests_share_one_refresh() {
        let server = MockServer::start().await;
        mount_token(&server, "access-1", 1).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/me"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let session = Arc::new(session_for(&server, expired("access-0")));
        let request = session.prepare(Method::GET, "/api/v2/me").unwrap();

        let (first, second) = tokio::join!(session.execute(&request), session.execute(&request));
        assert!(first.is_ok());
        assert!(second.is_ok());

        let creds = session.credentials();
        assert_eq!(creds.access_token, "access-1");
        assert_eq!(creds.refresh_token, "refresh-1");
        assert!(!creds.is_expired());
    }

    #[test]
    fn test_prepared_request_keeps_body() {
        let request = PreparedRequest::new(
            Method::POST,
            Url::parse("https://sandbox.melhorenvio.com.br/api/v2/me/cart").unwrap(),
        )
        .json(&serde_json::json!({"orders": ["a"]}))
        .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(
            request.body().map(|b| b.as_ref()),
            Some(br#"{"orders":["a"]}"#.as_slice())
        );
    }
}
