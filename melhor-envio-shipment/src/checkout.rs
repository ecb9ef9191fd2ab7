//! Paying for cart items.

use crate::client::{route, ShipmentClient};
use crate::decode::{decode, Expect};
use melhor_envio_core::{Operation, Result};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

const EXPECT: Expect = Expect::authenticated(
    Operation::Checkout,
    StatusCode::OK,
    &[StatusCode::UNPROCESSABLE_ENTITY],
);

/// Orders to pay for, by cart item id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Cart item ids.
    pub orders: Vec<String>,
}

impl CheckoutRequest {
    /// Check out the given orders.
    pub fn new<I, S>(orders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            orders: orders.into_iter().map(Into::into).collect(),
        }
    }
}

/// An order included in a purchase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Order id.
    pub id: String,
    /// Order protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Order status after payment, usually `released`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Purchase created by a checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Purchase id.
    pub id: String,
    /// Purchase protocol.
    pub protocol: String,
    /// Amount charged to the wallet.
    pub total: f64,
    /// Discount applied.
    #[serde(default)]
    pub discount: f64,
    /// Purchase status, `paid` once settled.
    pub status: String,
    /// When the purchase was paid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    /// Orders paid for.
    #[serde(default)]
    pub orders: Vec<PurchaseOrder>,
}

/// Checkout result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    /// The purchase.
    pub purchase: Purchase,
}

impl ShipmentClient {
    /// Pay for cart items with the account wallet.
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse> {
        let prepared = self
            .session
            .prepare(Method::POST, &route("/shipment/checkout"))?
            .json(request)?;
        let response = self.session.execute(&prepared).await?;
        let checkout: CheckoutResponse = decode(&self.session, response, EXPECT).await?;
        tracing::info!(
            purchase_id = %checkout.purchase.id,
            total = checkout.purchase.total,
            orders = checkout.purchase.orders.len(),
            "checkout completed"
        );
        Ok(checkout)
    }
}
