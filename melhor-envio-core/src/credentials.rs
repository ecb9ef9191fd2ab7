//! OAuth2 credential state for a session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client identity plus the current token state.
///
/// Owned by exactly one session. Only the token exchange replaces the token
/// fields, and it does so while holding the session's exchange guard.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Application client id issued by Melhor Envio.
    pub client_id: i32,
    /// Application client secret.
    pub client_secret: String,
    /// Current bearer token. Empty until the first grant.
    #[serde(default)]
    pub access_token: String,
    /// Token used for the refresh grant. Empty until the first grant.
    #[serde(default)]
    pub refresh_token: String,
    /// Absolute expiry of `access_token`. `None` means "never obtained".
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Authorization code awaiting exchange.
    #[serde(default)]
    pub code: Option<String>,
}

impl Credentials {
    /// Create credentials holding only the client identity.
    pub fn new(client_id: i32, client_secret: impl Into<String>) -> Self {
        Self {
            client_id,
            client_secret: client_secret.into(),
            ..Default::default()
        }
    }

    /// Seed with a refresh token saved from an earlier session.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = refresh_token.into();
        self
    }

    /// Seed with an access token and its expiry.
    #[must_use]
    pub fn with_access_token(
        mut self,
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        self.access_token = access_token.into();
        self.expires_at = Some(expires_at);
        self
    }

    /// Seed with an authorization code received on the redirect URI.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The pending authorization code, if a non-empty one is stored.
    #[must_use]
    pub fn pending_code(&self) -> Option<&str> {
        self.code.as_deref().filter(|code| !code.is_empty())
    }

    /// Whether a non-empty refresh token is stored.
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Whether the access token is unusable at `now`.
    ///
    /// A token is valid only while `now < expires_at`; equality counts as
    /// expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => true,
        }
    }

    /// Whether the access token is unusable right now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Install the outcome of a successful grant.
    ///
    /// Sets the expiry to `now + expires_in` seconds and clears the pending
    /// authorization code.
    ///
    /// Returns `false` and leaves the credentials untouched when the expiry
    /// is not a representable timestamp.
    #[must_use]
    pub fn apply_grant(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(expires_at) = Duration::try_seconds(expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
        else {
            return false;
        };
        self.access_token = access_token.into();
        self.refresh_token = refresh_token.into();
        self.expires_at = Some(expires_at);
        self.code = None;
        true
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .field("code", &self.code.as_deref().map(redact))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}
