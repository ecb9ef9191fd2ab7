//! One-stop client: a shared session plus the shipment endpoints.

use melhor_envio_auth::Session;
use melhor_envio_core::{Result, SessionConfig};
use melhor_envio_shipment::ShipmentClient;
use std::sync::Arc;

/// Session and shipment client bundled together.
///
/// # Example
///
/// ```rust,ignore
/// use melhor_envio::prelude::*;
///
/// let client = MelhorEnvio::from_env("MELHOR_ENVIO")?;
/// client.connect().await?;
/// let quotes = client.shipments().quote(&request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MelhorEnvio {
    session: Arc<Session>,
    shipments: ShipmentClient,
}

impl MelhorEnvio {
    /// Build a client from a configuration.
    pub fn new(config: SessionConfig) -> Result<Self> {
        Ok(Self::from_session(Arc::new(Session::new(config)?)))
    }

    /// Build a client from `{PREFIX}_*` environment variables.
    ///
    /// See [`SessionConfig::from_env`] for the variables read.
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::new(SessionConfig::from_env(prefix)?)
    }

    /// Wrap an existing session.
    pub fn from_session(session: Arc<Session>) -> Self {
        Self {
            shipments: ShipmentClient::new(Arc::clone(&session)),
            session,
        }
    }

    /// Obtain a usable access token up front.
    ///
    /// Exchanges a pending authorization code if there is one, otherwise
    /// refreshes when the stored token is expired. A valid stored token is
    /// left alone. Calling this is optional: requests refresh on demand.
    pub async fn connect(&self) -> Result<()> {
        let snapshot = self.session.credentials();
        if snapshot.pending_code().is_some() {
            tracing::debug!("exchanging pending authorization code");
            self.session.authenticate_by_code().await
        } else if snapshot.is_expired() {
            tracing::debug!("stored access token expired, refreshing");
            self.session.refresh_token().await
        } else {
            Ok(())
        }
    }

    /// The shared session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Shipment endpoints.
    pub fn shipments(&self) -> &ShipmentClient {
        &self.shipments
    }

    /// Abort in-flight calls and refuse new ones.
    pub fn shutdown(&self) {
        self.session.shutdown();
    }
}
