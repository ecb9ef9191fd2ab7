//! Freight quotes.

use crate::client::{route, ShipmentClient};
use crate::decode::{decode, Expect};
use crate::types::{Company, DeliveryRange, Dimensions};
use melhor_envio_core::{Operation, Result};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

const EXPECT: Expect = Expect::authenticated(
    Operation::Quote,
    StatusCode::OK,
    &[StatusCode::UNPROCESSABLE_ENTITY],
);

/// A postal address reduced to its CEP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// CEP, with or without the hyphen.
    pub postal_code: String,
}

impl Location {
    /// Create a location from a CEP.
    pub fn new(postal_code: impl Into<String>) -> Self {
        Self {
            postal_code: postal_code.into(),
        }
    }
}

/// A product to pack; the API chooses the boxes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Caller-side product id.
    pub id: String,
    /// Product measurements.
    #[serde(flatten)]
    pub dimensions: Dimensions,
    /// Weight in kilograms.
    pub weight: f64,
    /// Declared value in BRL.
    pub insurance_value: f64,
    /// Units of this product.
    pub quantity: i32,
}

/// A pre-packed volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Volume measurements.
    #[serde(flatten)]
    pub dimensions: Dimensions,
    /// Weight in kilograms.
    pub weight: f64,
    /// Declared value in BRL.
    pub insurance_value: f64,
}

/// Additional services priced into the quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteOptions {
    /// Delivery receipt (aviso de recebimento).
    pub receipt: bool,
    /// Hand delivery to the addressee only.
    pub own_hand: bool,
}

/// Freight quote request.
///
/// Send either `products` or `volumes`; empty lists are left out of the
/// payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Origin.
    pub from: Location,
    /// Destination.
    pub to: Location,
    /// Products to pack.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
    /// Pre-packed volumes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Additional services.
    #[serde(default)]
    pub options: QuoteOptions,
    /// Comma separated service ids to restrict the quote to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,
}

impl QuoteRequest {
    /// Quote from one CEP to another.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Location::new(from),
            to: Location::new(to),
            ..Default::default()
        }
    }

    /// Add a product.
    #[must_use]
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Add a volume.
    #[must_use]
    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volumes.push(volume);
        self
    }

    /// Set the additional services.
    #[must_use]
    pub fn with_options(mut self, options: QuoteOptions) -> Self {
        self.options = options;
        self
    }

    /// Restrict the quote to the given service ids.
    #[must_use]
    pub fn with_services<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
        self.services = Some(ids.join(","));
        self
    }
}

/// Product reference inside a quoted package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageProduct {
    /// Caller-side product id.
    pub id: String,
    /// Units packed.
    #[serde(default)]
    pub quantity: i32,
}

/// A box the API packed the products into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    /// Price of this package, decimal string.
    pub price: String,
    /// Discount, decimal string.
    pub discount: String,
    /// `box`, `roll` or `letter`.
    pub format: String,
    /// Package measurements.
    pub dimensions: Dimensions,
    /// Weight, decimal string.
    pub weight: String,
    /// Declared value, decimal string.
    pub insurance_value: String,
    /// Products inside.
    pub products: Vec<PackageProduct>,
}

/// Additional services included in a quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalServices {
    /// Delivery receipt.
    pub receipt: bool,
    /// Hand delivery.
    pub own_hand: bool,
    /// Pickup at the sender.
    pub collect: bool,
}

/// One carrier service's answer to a quote.
///
/// Services that cannot carry the shipment come back with `error` set and
/// no price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Service id, used later as [`AddToCartRequest::service`](crate::AddToCartRequest::service).
    pub id: i32,
    /// Service name.
    pub name: String,
    /// Price, decimal string.
    #[serde(default)]
    pub price: Option<String>,
    /// Price after account-level adjustments, decimal string.
    #[serde(default)]
    pub custom_price: Option<String>,
    /// Discount, decimal string.
    #[serde(default)]
    pub discount: Option<String>,
    /// Currency code, usually `R$`.
    #[serde(default)]
    pub currency: Option<String>,
    /// Delivery time in business days.
    #[serde(default)]
    pub delivery_time: Option<i32>,
    /// Delivery window.
    #[serde(default)]
    pub delivery_range: Option<DeliveryRange>,
    /// Delivery time after account-level adjustments.
    #[serde(default)]
    pub custom_delivery_time: Option<i32>,
    /// Delivery window after account-level adjustments.
    #[serde(default)]
    pub custom_delivery_range: Option<DeliveryRange>,
    /// Packing plan.
    #[serde(default)]
    pub packages: Vec<Package>,
    /// Additional services included.
    #[serde(default)]
    pub additional_services: Option<AdditionalServices>,
    /// Carrier.
    #[serde(default)]
    pub company: Company,
    /// Why this service cannot carry the shipment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Quote {
    /// Whether the service can carry the shipment.
    pub fn is_available(&self) -> bool {
        self.error.is_none() && self.price.is_some()
    }

    /// Price parsed as a number.
    pub fn price_value(&self) -> Option<f64> {
        self.price.as_deref().and_then(|p| p.parse().ok())
    }
}

impl ShipmentClient {
    /// Quote a shipment against every service enabled on the account.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`](melhor_envio_core::Error::Validation) on 422,
    /// [`Error::InvalidToken`](melhor_envio_core::Error::InvalidToken) when
    /// re-authentication did not help.
    pub async fn quote(&self, request: &QuoteRequest) -> Result<Vec<Quote>> {
        let prepared = self
            .session
            .prepare(Method::POST, &route("/shipment/calculate"))?
            .json(request)?;
        let response = self.session.execute(&prepared).await?;
        let quotes: Vec<Quote> = decode(&self.session, response, EXPECT).await?;
        tracing::debug!(count = quotes.len(), "quote received");
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bearer, client_for, rejection};
    use melhor_envio_core::Error;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> QuoteRequest {
        QuoteRequest::new("01001-000", "20040-020").with_product(Product {
            id: "x".into(),
            dimensions: Dimensions::new(4.0, 12.0, 17.0),
            weight: 1.5,
            insurance_value: 10.1,
            quantity: 1,
        })
    }

    fn sample_response() -> serde_json::Value {
        json!([
            {
                "id": 1,
                "name": "PAC",
                "price": "25.30",
                "custom_price": "25.30",
                "discount": "4.70",
                "currency": "R$",
                "delivery_time": 6,
                "delivery_range": { "min": 5, "max": 6 },
                "custom_delivery_time": 6,
                "custom_delivery_range": { "min": 5, "max": 6 },
                "packages": [{
                    "price": "25.30",
                    "discount": "4.70",
                    "format": "box",
                    "dimensions": { "height": 4, "width": 12, "length": 17 },
                    "weight": "1.50",
                    "insurance_value": "10.10",
                    "products": [{ "id": "x", "quantity": 1 }]
                }],
                "additional_services": { "receipt": false, "own_hand": false, "collect": false },
                "company": { "id": 1, "name": "Correios", "picture": "https://example.com/correios.png" }
            },
            {
                "id": 2,
                "name": "SEDEX",
                "price": "41.90",
                "delivery_time": 2,
                "delivery_range": { "min": 1, "max": 2 },
                "packages": [],
                "company": { "id": 1, "name": "Correios", "picture": "" }
            },
            {
                "id": 3,
                "name": ".Package",
                "error": "Transportadora não atende este trecho.",
                "company": { "id": 2, "name": "Jadlog", "picture": "" }
            }
        ])
    }

    #[test]
    fn test_request_payload() {
        let payload = serde_json::to_value(sample_request().with_services([1, 2, 17])).unwrap();
        assert_eq!(
            payload,
            json!({
                "from": { "postal_code": "01001-000" },
                "to": { "postal_code": "20040-020" },
                "products": [{
                    "id": "x",
                    "height": 4.0,
                    "width": 12.0,
                    "length": 17.0,
                    "weight": 1.5,
                    "insurance_value": 10.1,
                    "quantity": 1
                }],
                "options": { "receipt": false, "own_hand": false },
                "services": "1,2,17"
            })
        );
    }

    #[tokio::test]
    async fn test_quote() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/me/shipment/calculate"))
            .and(bearer())
            .and(body_json(serde_json::to_value(sample_request()).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_response()))
            .expect(1)
            .mount(&server)
            .await;

        let quotes = client_for(&server).quote(&sample_request()).await.unwrap();

        assert_eq!(quotes.len(), 3);
        let pac = &quotes[0];
        assert_eq!(pac.price.as_deref(), Some("25.30"));
        assert_eq!(pac.price_value(), Some(25.30));
        assert_eq!(pac.delivery_range, Some(DeliveryRange { min: 5, max: 6 }));
        assert_eq!(pac.packages[0].products[0].id, "x");
        assert_eq!(pac.company.name, "Correios");
        assert!(pac.is_available());

        assert!(quotes[1].additional_services.is_none());
        assert!(!quotes[2].is_available());
        assert!(quotes[2].delivery_range.is_none());
    }

    #[tokio::test]
    async fn test_quote_validation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/me/shipment/calculate"))
            .respond_with(ResponseTemplate::new(422).set_body_json(rejection(
                "The given data was invalid.",
                "to.postal_code",
                "O campo to.postal_code é obrigatório.",
            )))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .quote(&QuoteRequest::new("01001-000", ""))
            .await
            .unwrap_err();

        let Error::Validation(validation) = err else {
            panic!("expected validation error");
        };
        assert_eq!(validation.operation, Operation::Quote);
        assert_eq!(validation.status, Some(422));
        assert_eq!(
            validation.field("to.postal_code"),
            ["O campo to.postal_code é obrigatório.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_quote_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/me/shipment/calculate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Server Error"))
            .mount(&server)
            .await;

        let err = client_for(&server).quote(&sample_request()).await.unwrap_err();

        assert!(matches!(
            err,
            Error::UnrecognizedResponse { operation: Operation::Quote, status: 500, ref body }
                if body == "Server Error"
        ));
    }

    #[tokio::test]
    async fn test_quote_garbled_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/me/shipment/calculate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}"))
            .mount(&server)
            .await;

        let err = client_for(&server).quote(&sample_request()).await.unwrap_err();

        assert!(matches!(err, Error::UnrecognizedResponse { status: 200, .. }));
    }
}
