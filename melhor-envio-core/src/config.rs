//! Session configuration.

use crate::credentials::Credentials;
use crate::errors::{Error, Result};
use crate::sink::{CredentialSink, FnSink, NoopSink};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Sandbox API base URL.
pub const SANDBOX_API_URL: &str = "https://sandbox.melhorenvio.com.br";

/// Production API base URL.
pub const PRODUCTION_API_URL: &str = "https://melhorenvio.com.br";

/// Which Melhor Envio deployment a session talks to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Environment {
    /// Sandbox (default).
    #[default]
    Sandbox,
    /// Production.
    Production,
    /// Any other base URL, e.g. a local mock server.
    Custom(String),
}

impl Environment {
    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match self {
            Environment::Sandbox => SANDBOX_API_URL,
            Environment::Production => PRODUCTION_API_URL,
            Environment::Custom(url) => url.trim_end_matches('/'),
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "sandbox" => Ok(Environment::Sandbox),
            "production" | "prod" => Ok(Environment::Production),
            other if other.starts_with("http://") || other.starts_with("https://") => {
                Ok(Environment::Custom(s.trim().to_string()))
            }
            other => Err(Error::configuration(format!("unknown environment: {other}"))),
        }
    }
}

/// Application identity sent in the mandatory `User-Agent` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppIdentity {
    /// Application name.
    pub name: String,
    /// Technical contact email.
    pub email: String,
}

impl AppIdentity {
    /// Create a new identity.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// `"<name> (<email>)"`.
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!("{} ({})", self.name, self.email)
    }
}

/// Everything a session needs at construction.
///
/// Immutable once handed to a session, except for the embedded
/// [`Credentials`], which the session evolves.
#[derive(Clone)]
pub struct SessionConfig {
    /// Initial credentials.
    pub credentials: Credentials,
    /// Target deployment.
    pub environment: Environment,
    /// Redirect URI registered for the application.
    pub redirect_uri: Option<String>,
    /// Application identity for the `User-Agent` header.
    pub identity: AppIdentity,
    /// Scopes requested by the authorization URL.
    pub scopes: Vec<String>,
    /// Per-request timeout applied to the HTTP client.
    pub timeout: Option<Duration>,
    /// Receives credentials after every grant.
    pub sink: Arc<dyn CredentialSink>,
}

impl SessionConfig {
    /// Create a config for the given credentials and identity.
    pub fn new(credentials: Credentials, identity: AppIdentity) -> Self {
        Self {
            credentials,
            environment: Environment::default(),
            redirect_uri: None,
            identity,
            scopes: Vec::new(),
            timeout: None,
            sink: Arc::new(NoopSink),
        }
    }

    /// Set the target deployment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.environment = Environment::Custom(url.into());
        self
    }

    /// Set the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Set the authorization scopes.
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Register a credential sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn CredentialSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Register a closure invoked whenever credentials change.
    #[must_use]
    pub fn on_credentials_changed<F>(self, callback: F) -> Self
    where
        F: Fn(&Credentials) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with_sink(Arc::new(FnSink::new(callback)))
    }

    /// Load from environment variables with the given prefix.
    ///
    /// Looks for:
    /// - `{PREFIX}_CLIENT_ID` (required)
    /// - `{PREFIX}_CLIENT_SECRET` (required)
    /// - `{PREFIX}_APP_NAME` and `{PREFIX}_EMAIL` (required)
    /// - `{PREFIX}_REFRESH_TOKEN`
    /// - `{PREFIX}_CODE`
    /// - `{PREFIX}_REDIRECT_URI`
    /// - `{PREFIX}_ENVIRONMENT` (`sandbox`, `production` or a URL)
    pub fn from_env(prefix: &str) -> Result<Self> {
        let var = |name: &str| std::env::var(format!("{prefix}_{name}")).ok();
        let required = |name: &str| {
            var(name).ok_or_else(|| {
                Error::configuration(format!("{prefix}_{name} environment variable not set"))
            })
        };

        let client_id = required("CLIENT_ID")?
            .trim()
            .parse::<i32>()
            .map_err(|err| Error::configuration(format!("{prefix}_CLIENT_ID: {err}")))?;
        let mut credentials = Credentials::new(client_id, required("CLIENT_SECRET")?);
        if let Some(refresh_token) = var("REFRESH_TOKEN") {
            credentials = credentials.with_refresh_token(refresh_token);
        }
        if let Some(code) = var("CODE") {
            credentials = credentials.with_code(code);
        }

        let identity = AppIdentity::new(required("APP_NAME")?, required("EMAIL")?);
        let mut config = Self::new(credentials, identity);
        if let Some(uri) = var("REDIRECT_URI") {
            config = config.with_redirect_uri(uri);
        }
        if let Some(environment) = var("ENVIRONMENT") {
            config = config.with_environment(environment.parse()?);
        }
        Ok(config)
    }

    /// Check the fields every request depends on.
    pub fn validate(&self) -> Result<()> {
        if self.credentials.client_id == 0 {
            return Err(Error::configuration("client id is required"));
        }
        if self.credentials.client_secret.is_empty() {
            return Err(Error::configuration("client secret is required"));
        }
        if self.identity.name.trim().is_empty() || self.identity.email.trim().is_empty() {
            return Err(Error::configuration(
                "application name and contact email are required for the User-Agent",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("credentials", &self.credentials)
            .field("environment", &self.environment)
            .field("redirect_uri", &self.redirect_uri)
            .field("identity", &self.identity)
            .field("scopes", &self.scopes)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
