//! Types shared by several endpoints.

use serde::{Deserialize, Serialize};

/// Box measurements in centimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Height.
    pub height: f64,
    /// Width.
    pub width: f64,
    /// Length.
    pub length: f64,
}

impl Dimensions {
    /// Create dimensions from height, width and length.
    pub fn new(height: f64, width: f64, length: f64) -> Self {
        Self {
            height,
            width,
            length,
        }
    }
}

/// Delivery window in business days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRange {
    /// Earliest delivery.
    pub min: i32,
    /// Latest delivery.
    pub max: i32,
}

/// Whether a carrier or service currently accepts shipments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Accepting shipments.
    Available,
    /// Temporarily disabled.
    Unavailable,
    /// A status this client does not know about.
    #[serde(other)]
    Other,
}

/// A carrier.
///
/// Quotes only carry `id`, `name` and `picture`; the services and companies
/// routes fill in the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Carrier id.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Logo URL.
    #[serde(default)]
    pub picture: String,
    /// Whether volumes are grouped in a single label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_grouped_volumes: Option<i32>,
    /// Carrier availability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceStatus>,
    /// Public tracking page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_link: Option<String>,
    /// Whether the account ships under its own carrier contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_own_contract: Option<bool>,
    /// Maximum labels per batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<i32>,
}
