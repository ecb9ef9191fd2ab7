//! # melhor-envio
//!
//! Async Rust client for the [Melhor Envio](https://melhorenvio.com.br)
//! shipping API.
//!
//! ## Quick Start
//!
//! ```ignore
//! use melhor_envio::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = MelhorEnvio::new(
//!         SessionConfig::new(
//!             Credentials::new(1234, "client-secret").with_refresh_token(saved_refresh_token),
//!             AppIdentity::new("Minha Loja", "dev@minhaloja.com.br"),
//!         )
//!         .on_credentials_changed(|creds| save_refresh_token(&creds.refresh_token)),
//!     )?;
//!
//!     let request = QuoteRequest::new("01001-000", "20040-020").with_product(Product {
//!         id: "camiseta".into(),
//!         dimensions: Dimensions::new(4.0, 12.0, 17.0),
//!         weight: 0.3,
//!         insurance_value: 49.9,
//!         quantity: 1,
//!     });
//!
//!     for quote in client.shipments().quote(&request).await? {
//!         if let Some(price) = &quote.price {
//!             println!("{} {}: R$ {price}", quote.company.name, quote.name);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! The API uses OAuth2. A new installation sends the user to
//! [`Session::authorize_url`], receives a `code` on the redirect URI and
//! exchanges it with [`Session::authenticate_by_code`]. From then on the
//! refresh token is enough: every authenticated call refreshes an expired
//! token before sending, and re-authenticates once when the API answers 401.
//!
//! New tokens are handed to the [`CredentialSink`] registered on the
//! configuration; persist at least the refresh token there.
//!
//! ## Architecture
//!
//! - [`melhor_envio_core`] - Errors, credentials, configuration
//! - [`melhor_envio_auth`] - Session, token exchange, request pipeline
//! - [`melhor_envio_shipment`] - Quote, cart, checkout, labels, catalog

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod client;

pub use client::MelhorEnvio;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Errors, credentials and configuration.
pub use melhor_envio_core as core;

/// Session, token exchange and request pipeline.
pub use melhor_envio_auth as auth;

/// Shipment endpoints.
pub use melhor_envio_shipment as shipment;

// ============================================================================
// Flat Re-exports
// ============================================================================

pub use melhor_envio_core::{
    AppIdentity, CredentialSink, Credentials, Environment, Error, FnSink, NoopSink, Operation,
    Result, SessionConfig, ValidationError, PRODUCTION_API_URL, SANDBOX_API_URL,
};

pub use melhor_envio_auth::{CancellationToken, PreparedRequest, Session};

pub use melhor_envio_shipment::{
    AddToCartRequest, CartItem, CartOptions, CartProduct, CartVolume, CheckoutRequest,
    CheckoutResponse, Company, Dimensions, GenerateRequest, GenerateStatus, Location, Party,
    PrintMode, PrintRequest, PrintResponse, Product, Quote, QuoteOptions, QuoteRequest, Service,
    ShipmentClient, Volume,
};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for common imports.
///
/// ```rust
/// use melhor_envio::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AddToCartRequest, AppIdentity, CartOptions, CartProduct, CartVolume, CheckoutRequest,
        CredentialSink, Credentials, Dimensions, Environment, Error, GenerateRequest,
        MelhorEnvio, Party, PrintMode, PrintRequest, Product, QuoteOptions, QuoteRequest, Result,
        Session, SessionConfig, ShipmentClient, Volume,
    };
}
