//! The long-lived API session.

use melhor_envio_core::{Credentials, CredentialSink, Error, Result, SessionConfig};
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Authenticated session against the Melhor Envio API.
///
/// Owns the credential store, the HTTP transport and the cancellation token
/// every outbound call is raced against. Share it behind an [`Arc`]; all
/// methods take `&self`.
///
/// Credential reads always return a snapshot. Credential writes happen only
/// inside a token exchange, which holds the exchange guard for the whole
/// round trip, so at most one grant mutates the store at a time.
///
/// # Example
///
/// ```rust,ignore
/// use melhor_envio_auth::Session;
/// use melhor_envio_core::{AppIdentity, Credentials, SessionConfig};
///
/// let config = SessionConfig::new(
///     Credentials::new(1234, "secret").with_code(code_from_redirect),
///     AppIdentity::new("Minha Loja", "dev@minhaloja.com.br"),
/// )
/// .with_redirect_uri("https://minhaloja.com.br/callback");
///
/// let session = Session::new(config)?;
/// session.authenticate_by_code().await?;
/// ```
pub struct Session {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) redirect_uri: Option<String>,
    pub(crate) scopes: Vec<String>,
    pub(crate) default_headers: HeaderMap,
    pub(crate) sink: Arc<dyn CredentialSink>,
    pub(crate) credentials: RwLock<Credentials>,
    pub(crate) exchange: Mutex<()>,
    cancel: CancellationToken,
    initialized: AtomicBool,
}

impl Session {
    /// Create a session with its own cancellation token.
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_cancellation(config, CancellationToken::new())
    }

    /// Create a session whose outbound calls abort when `cancel` fires.
    pub fn with_cancellation(config: SessionConfig, cancel: CancellationToken) -> Result<Self> {
        config.validate()?;

        let base_url = config.environment.base_url().to_string();
        Url::parse(&base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Self::with_client(config, client, base_url, cancel)
    }

    fn with_client(
        config: SessionConfig,
        client: Client,
        base_url: String,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let user_agent = config.identity.user_agent();
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent).map_err(|_| Error::InvalidHeader(user_agent))?,
        );

        tracing::debug!(base_url = %base_url, client_id = config.credentials.client_id, "session created");

        Ok(Self {
            client,
            base_url,
            redirect_uri: config.redirect_uri,
            scopes: config.scopes,
            default_headers,
            sink: config.sink,
            credentials: RwLock::new(config.credentials),
            exchange: Mutex::new(()),
            cancel,
            initialized: AtomicBool::new(true),
        })
    }

    /// Whether the session accepts calls.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Abort in-flight calls and refuse new ones with [`Error::NotInitialized`].
    pub fn shutdown(&self) {
        self.initialized.store(false, Ordering::Release);
        self.cancel.cancel();
        tracing::debug!("session shut down");
    }

    /// Token cancelled when the session shuts down.
    ///
    /// Cancellation is session-wide. To bound a single call, drop its future
    /// or wrap it in `tokio::time::timeout`.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Snapshot of the current credentials.
    pub fn credentials(&self) -> Credentials {
        self.credentials.read().clone()
    }

    /// API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store an authorization code received on the redirect URI.
    ///
    /// The code is consumed by the next [`Session::authenticate_by_code`].
    pub async fn set_authorization_code(&self, code: impl Into<String>) -> Result<()> {
        self.ensure_initialized()?;
        let _guard = self.exchange.lock().await;
        self.credentials.write().code = Some(code.into());
        Ok(())
    }

    /// Resolve an API path (starting with `/`) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    /// Read a response body, honouring cancellation.
    pub async fn read_body(&self, response: Response) -> Result<String> {
        self.cancellable(response.text()).await
    }

    pub(crate) fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    pub(crate) async fn send(&self, request: reqwest::Request) -> Result<Response> {
        self.cancellable(self.client.execute(request)).await
    }

    async fn cancellable<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = reqwest::Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = fut => result.map_err(Error::from),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
