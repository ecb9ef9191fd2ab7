//! Label generation and printing for paid orders.

use crate::client::{route, ShipmentClient};
use crate::decode::{decode, Expect};
use melhor_envio_core::{Operation, Result};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const GENERATE: Expect = Expect::authenticated(
    Operation::Generate,
    StatusCode::OK,
    &[StatusCode::UNPROCESSABLE_ENTITY],
);

const PRINT: Expect = Expect::authenticated(
    Operation::Print,
    StatusCode::OK,
    &[StatusCode::UNPROCESSABLE_ENTITY, StatusCode::BAD_REQUEST],
);

/// Orders to generate labels for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Order ids.
    pub orders: Vec<String>,
}

impl GenerateRequest {
    /// Generate labels for the given orders.
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

/// Outcome of label generation for one order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateStatus {
    /// Whether the label was generated.
    pub status: bool,
    /// Carrier or API message.
    #[serde(default)]
    pub message: String,
}

/// Label access mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    /// Link requires the account's session.
    #[default]
    Private,
    /// Link anyone can open.
    Public,
}

/// Orders to print labels for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintRequest {
    /// Access mode of the returned link.
    pub mode: PrintMode,
    /// Order ids.
    pub orders: Vec<String>,
}

impl PrintRequest {
    /// Print labels for the given orders.
    pub fn new<I, S>(mode: PrintMode, orders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode,
            orders: orders.into_iter().map(Into::into).collect(),
        }
    }
}

/// Link to the printable labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintResponse {
    /// PDF URL.
    pub url: String,
}

impl ShipmentClient {
    /// Generate carrier labels, keyed by order id.
    ///
    /// A 200 can still report per-order failures; check each
    /// [`GenerateStatus::status`].
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<BTreeMap<String, GenerateStatus>> {
        let prepared = self
            .session
            .prepare(Method::POST, &route("/shipment/generate"))?
            .json(request)?;
        let response = self.session.execute(&prepared).await?;
        let statuses: BTreeMap<String, GenerateStatus> =
            decode(&self.session, response, GENERATE).await?;

        let failed = statuses.values().filter(|s| !s.status).count();
        if failed > 0 {
            tracing::warn!(failed, total = statuses.len(), "some labels were not generated");
        }
        Ok(statuses)
    }

    /// Get a printable link for generated labels.
    pub async fn print(&self, request: &PrintRequest) -> Result<PrintResponse> {
        let prepared = self
            .session
            .prepare(Method::POST, &route("/shipment/print"))?
            .json(request)?;
        let response = self.session.execute(&prepared).await?;
        decode(&self.session, response, PRINT).await
    }
}
