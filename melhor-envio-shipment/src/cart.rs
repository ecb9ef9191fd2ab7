//! Cart: add shipments before paying for them, or drop them again.

use crate::client::{route, ShipmentClient};
use crate::decode::{decode, decode_empty, Expect};
use crate::quote::QuoteOptions;
use crate::types::Dimensions;
use melhor_envio_auth::PreparedRequest;
use melhor_envio_core::{Error, Operation, Result};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

const ADD: Expect = Expect::authenticated(
    Operation::Cart,
    StatusCode::CREATED,
    &[StatusCode::UNPROCESSABLE_ENTITY],
);

const REMOVE: Expect = Expect::authenticated(
    Operation::Cart,
    StatusCode::NO_CONTENT,
    &[StatusCode::UNPROCESSABLE_ENTITY, StatusCode::BAD_REQUEST],
);

/// Sender or recipient of a shipment. Unset fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// CPF.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// CNPJ.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_document: Option<String>,
    /// Inscrição estadual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_register: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// ISO country code, `BR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Two-letter state, `SP`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_abbr: Option<String>,
}

/// Declared content of a shipment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unitary_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// A packed volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartVolume {
    #[serde(flatten)]
    pub dimensions: Dimensions,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// NF-e access key.
    pub key: String,
}

/// Tag attached to the order, shown in the Melhor Envio panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Shipping options for a cart item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartOptions {
    #[serde(flatten)]
    pub services: QuoteOptions,
    /// Reverse logistics.
    pub reverse: bool,
    /// Shipment without an invoice (declaração de conteúdo).
    pub non_commercial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    /// Name of the sales platform.
    #[serde(
        rename = "plataform",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// Request to add one shipment to the cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddToCartRequest {
    /// Service id from a [`Quote`](crate::Quote).
    pub service: i32,
    /// Drop-off agency, required by some carriers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<i32>,
    pub from: Party,
    pub to: Party,
    pub products: Vec<CartProduct>,
    pub volumes: Vec<CartVolume>,
    pub options: CartOptions,
}

/// Volume as stored on a cart item. Measurements come back as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartVolumeInfo {
    pub id: i32,
    pub height: Option<String>,
    pub width: Option<String>,
    pub length: Option<String>,
    pub diameter: Option<String>,
    pub weight: Option<String>,
    pub format: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// An order sitting in the cart.
///
/// Timestamps are kept as the API's `YYYY-MM-DD HH:MM:SS` strings and are
/// `None` until the order reaches that stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartItem {
    /// Order id, used by checkout, generate and print.
    pub id: String,
    pub protocol: String,
    pub service_id: i32,
    pub agency_id: Option<i32>,
    pub contract: Option<String>,
    pub service_code: Option<String>,
    pub quote: f64,
    pub price: f64,
    pub coupon: Option<String>,
    pub discount: f64,
    pub delivery_min: i32,
    pub delivery_max: i32,
    pub status: String,
    pub reminder: Option<String>,
    pub insurance_value: f64,
    pub weight: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub length: Option<String>,
    pub diameter: Option<String>,
    pub format: Option<String>,
    pub billed_weight: f64,
    pub receipt: bool,
    pub own_hand: bool,
    pub collect: bool,
    pub collect_scheduled_at: Option<String>,
    pub non_commercial: bool,
    pub authorization_code: Option<String>,
    pub tracking: Option<String>,
    pub self_tracking: Option<String>,
    pub delivery_receipt: Option<String>,
    pub additional_info: Option<String>,
    pub cte_key: Option<String>,
    pub paid_at: Option<String>,
    pub generated_at: Option<String>,
    pub posted_at: Option<String>,
    pub delivered_at: Option<String>,
    pub canceled_at: Option<String>,
    pub suspended_at: Option<String>,
    pub expired_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub parse_pi_at: Option<String>,
    pub products: Vec<CartProduct>,
    pub volumes: Vec<CartVolumeInfo>,
}

impl ShipmentClient {
    /// Put a shipment in the cart.
    pub async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<CartItem> {
        let prepared = self
            .session
            .prepare(Method::POST, &route("/cart"))?
            .json(request)?;
        let response = self.session.execute(&prepared).await?;
        let item: CartItem = decode(&self.session, response, ADD).await?;
        tracing::debug!(order_id = %item.id, service = item.service_id, "added to cart");
        Ok(item)
    }

    /// Remove an order from the cart.
    pub async fn remove_from_cart(&self, order_id: &str) -> Result<()> {
        let mut url = self.session.endpoint(&route("/cart"))?;
        url.path_segments_mut()
            .map_err(|()| Error::configuration("base URL cannot carry a path"))?
            .push(order_id);
        let prepared = PreparedRequest::new(Method::DELETE, url);
        let response = self.session.execute(&prepared).await?;
        decode_empty(&self.session, response, REMOVE).await?;
        tracing::debug!(order_id, "removed from cart");
        Ok(())
    }
}
