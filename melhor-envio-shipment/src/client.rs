//! Entry point for the shipment endpoints.

use melhor_envio_auth::Session;
use std::sync::Arc;

/// Path prefix of every shipment route.
pub const API_PREFIX: &str = "/api/v2/me";

/// Client for the shipment endpoints.
///
/// Cheap to clone; every clone shares the same [`Session`], so a token
/// refreshed by one call is seen by all of them.
///
/// # Example
///
/// ```rust,ignore
/// use melhor_envio_shipment::{Location, Product, QuoteRequest, ShipmentClient};
///
/// let shipments = ShipmentClient::new(session.clone());
/// let quotes = shipments
///     .quote(&QuoteRequest::new("01001-000", "20040-020").with_product(product))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ShipmentClient {
    pub(crate) session: Arc<Session>,
}

impl ShipmentClient {
    /// Wrap a shared session.
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// The underlying session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

impl From<Arc<Session>> for ShipmentClient {
    fn from(session: Arc<Session>) -> Self {
        Self::new(session)
    }
}

pub(crate) fn route(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}
