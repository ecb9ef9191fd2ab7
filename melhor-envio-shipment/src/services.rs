//! Carrier and service catalog. These routes are public and sent without a
//! bearer token.

use crate::client::{route, ShipmentClient};
use crate::decode::{decode, Expect};
use crate::types::{Company, ServiceStatus};
use melhor_envio_core::{Operation, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Speed tier of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Normal,
    Express,
    Economic,
    /// A tier this client does not know about.
    #[serde(other)]
    Other,
}

/// Geographic coverage of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRange {
    /// Between states.
    Interstate,
    /// Within a single state.
    Intrastate,
    /// A coverage this client does not know about.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

/// Declared value limits. `max_dec` applies to shipments without an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InsuranceRange {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub max_dec: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxFormat {
    pub weight: MinMax,
    pub width: MinMax,
    pub height: MinMax,
    pub length: MinMax,
    /// Maximum of width + height + length.
    pub sum: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollFormat {
    pub weight: MinMax,
    pub diameter: MinMax,
    pub length: MinMax,
    /// Maximum of 2 * diameter + length.
    pub sum: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterFormat {
    pub weight: MinMax,
    pub width: MinMax,
    pub length: MinMax,
}

/// Package formats a service accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Formats {
    #[serde(rename = "box")]
    pub box_format: BoxFormat,
    pub roll: RollFormat,
    pub letter: LetterFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Restrictions {
    pub insurance_value: InsuranceRange,
    pub formats: Formats,
}

/// A shipping service offered by a carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i32,
    pub name: String,
    pub status: ServiceStatus,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub range: ServiceRange,
    #[serde(default)]
    pub restrictions: Restrictions,
    /// Party fields the service requires, e.g. `names`, `addresses`.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Additional services it supports, e.g. `AR`, `MP`, `VD`.
    #[serde(default)]
    pub optionals: Vec<String>,
    pub company: Company,
}

impl Service {
    /// Whether the service accepts shipments right now.
    pub fn is_available(&self) -> bool {
        self.status == ServiceStatus::Available
    }
}

impl ShipmentClient {
    /// Look up one service.
    pub async fn service(&self, id: i32) -> Result<Service> {
        let prepared = self
            .session
            .prepare(Method::GET, &route(&format!("/shipment/services/{id}")))?;
        let response = self.session.execute_public(&prepared).await?;
        decode(&self.session, response, Expect::public(Operation::Service)).await
    }

    /// List every service.
    pub async fn services(&self) -> Result<Vec<Service>> {
        let prepared = self
            .session
            .prepare(Method::GET, &route("/shipment/services"))?;
        let response = self.session.execute_public(&prepared).await?;
        decode(&self.session, response, Expect::public(Operation::Service)).await
    }

    /// List every carrier.
    pub async fn companies(&self) -> Result<Vec<Company>> {
        let prepared = self
            .session
            .prepare(Method::GET, &route("/shipment/companies"))?;
        let response = self.session.execute_public(&prepared).await?;
        decode(&self.session, response, Expect::public(Operation::Companies)).await
    }
}
