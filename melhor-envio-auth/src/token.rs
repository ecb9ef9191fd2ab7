//! OAuth2 token exchange.
//!
//! Both grants post JSON to `{base}/oauth/token`, hold the session's
//! exchange guard for the whole round trip and, on success, replace the
//! token fields of the credential store before notifying the sink.

use crate::session::Session;
use chrono::Utc;
use melhor_envio_core::{Credentials, Error, Operation, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Token endpoint path.
pub const TOKEN_PATH: &str = "/oauth/token";

const AUTHORIZATION_CODE: &str = "authorization_code";
const REFRESH_TOKEN: &str = "refresh_token";

/// Body of a token grant request.
#[derive(Debug, Serialize)]
struct GrantRequest<'a> {
    grant_type: &'static str,
    client_id: i32,
    client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

impl<'a> GrantRequest<'a> {
    fn authorization_code(
        credentials: &'a Credentials,
        code: &'a str,
        redirect_uri: Option<&'a str>,
    ) -> Self {
        Self {
            grant_type: AUTHORIZATION_CODE,
            client_id: credentials.client_id,
            client_secret: &credentials.client_secret,
            redirect_uri,
            code: Some(code),
            refresh_token: None,
        }
    }

    fn refresh(credentials: &'a Credentials) -> Self {
        Self {
            grant_type: REFRESH_TOKEN,
            client_id: credentials.client_id,
            client_secret: &credentials.client_secret,
            redirect_uri: None,
            code: None,
            refresh_token: Some(&credentials.refresh_token),
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Token type, always `Bearer` in practice.
    #[serde(default)]
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    /// New access token.
    pub access_token: String,
    /// New refresh token.
    pub refresh_token: String,
}

impl Session {
    /// Exchange the pending authorization code for tokens.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] after shutdown, [`Error::InvalidToken`] when
    /// no code is pending or the server answers 401, and
    /// [`Error::UnrecognizedResponse`] for any other non-200 status.
    pub async fn authenticate_by_code(&self) -> Result<()> {
        self.ensure_initialized()?;
        let has_code = self.credentials.read().pending_code().is_some();
        if !has_code {
            return Err(Error::InvalidToken);
        }

        let _guard = self.exchange.lock().await;
        let snapshot = self.credentials();
        let code = snapshot.pending_code().ok_or(Error::InvalidToken)?;
        let grant =
            GrantRequest::authorization_code(&snapshot, code, self.redirect_uri.as_deref());
        self.exchange_grant(&grant).await
    }

    /// Obtain a new access token with the stored refresh token.
    ///
    /// Always performs a grant, even if the current access token is valid.
    ///
    /// # Errors
    ///
    /// Same as [`Session::authenticate_by_code`], with
    /// [`Error::InvalidToken`] also returned when no refresh token is stored.
    pub async fn refresh_token(&self) -> Result<()> {
        self.refresh(None).await
    }

    /// Refresh on behalf of a request that found `observed` unusable.
    ///
    /// When another call already replaced `observed` with a token that is
    /// still valid, no grant is sent.
    pub(crate) async fn refresh_stale(&self, observed: &str) -> Result<()> {
        self.refresh(Some(observed)).await
    }

    async fn refresh(&self, observed: Option<&str>) -> Result<()> {
        self.ensure_initialized()?;
        let has_refresh_token = self.credentials.read().has_refresh_token();
        if !has_refresh_token {
            return Err(Error::InvalidToken);
        }

        let _guard = self.exchange.lock().await;
        let snapshot = self.credentials();
        if let Some(observed) = observed {
            if snapshot.access_token != observed && !snapshot.is_expired() {
                debug!("access token already refreshed by a concurrent call");
                return Ok(());
            }
        }
        if !snapshot.has_refresh_token() {
            return Err(Error::InvalidToken);
        }
        self.exchange_grant(&GrantRequest::refresh(&snapshot)).await
    }

    /// Send a grant and apply the response. The exchange guard must be held.
    async fn exchange_grant(&self, grant: &GrantRequest<'_>) -> Result<()> {
        let request = self
            .client
            .post(self.endpoint(TOKEN_PATH)?)
            .headers(self.default_headers.clone())
            .body(serde_json::to_vec(grant)?)
            .build()?;

        debug!(grant_type = grant.grant_type, "requesting token grant");
        let response = self.send(request).await?;
        let status = response.status();
        let body = self.read_body(response).await?;

        match status {
            StatusCode::OK => {
                let token: TokenResponse = serde_json::from_str(&body)?;
                let updated = {
                    let mut credentials = self.credentials.write();
                    let applied = credentials.apply_grant(
                        token.access_token,
                        token.refresh_token,
                        token.expires_in,
                        Utc::now(),
                    );
                    applied.then(|| credentials.clone())
                };
                let Some(updated) = updated else {
                    warn!(
                        grant_type = grant.grant_type,
                        expires_in = token.expires_in,
                        "token grant expiry out of range"
                    );
                    return Err(Error::unrecognized(Operation::Auth, status.as_u16(), body));
                };
                info!(
                    grant_type = grant.grant_type,
                    expires_at = ?updated.expires_at,
                    "token grant succeeded"
                );
                self.sink
                    .credentials_changed(&updated)
                    .await
                    .map_err(Error::CredentialSink)
            }
            StatusCode::UNAUTHORIZED => Err(Error::InvalidToken),
            _ => Err(Error::unrecognized(Operation::Auth, status.as_u16(), body)),
        }
    }
}
