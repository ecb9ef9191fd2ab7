//! # melhor-envio-shipment
//!
//! Shipment endpoints of the Melhor Envio API, built on an authenticated
//! [`Session`](melhor_envio_auth::Session).
//!
//! The usual flow for one parcel:
//!
//! 1. [`ShipmentClient::quote`] to pick a service
//! 2. [`ShipmentClient::add_to_cart`] with that service id
//! 3. [`ShipmentClient::checkout`] to pay from the account wallet
//! 4. [`ShipmentClient::generate`] to create the carrier label
//! 5. [`ShipmentClient::print`] for a PDF link
//!
//! Catalog lookups ([`ShipmentClient::service`], [`ShipmentClient::services`],
//! [`ShipmentClient::companies`]) hit public routes and never refresh tokens.
//!
//! Every call returns a [`melhor_envio_core::Result`]: 422 (and 400 where the
//! endpoint uses it) becomes [`Error::Validation`](melhor_envio_core::Error::Validation),
//! any status the endpoint does not document becomes
//! [`Error::UnrecognizedResponse`](melhor_envio_core::Error::UnrecognizedResponse).

#![deny(unsafe_code)]

mod cart;
mod checkout;
mod client;
mod decode;
mod labels;
mod quote;
mod services;
mod types;

#[cfg(test)]
mod testing;

pub use cart::{
    AddToCartRequest, CartItem, CartOptions, CartProduct, CartVolume, CartVolumeInfo, Invoice,
    Party, Tag,
};
pub use checkout::{CheckoutRequest, CheckoutResponse, Purchase, PurchaseOrder};
pub use client::{ShipmentClient, API_PREFIX};
pub use labels::{GenerateRequest, GenerateStatus, PrintMode, PrintRequest, PrintResponse};
pub use quote::{
    AdditionalServices, Location, Package, PackageProduct, Product, Quote, QuoteOptions,
    QuoteRequest, Volume,
};
pub use services::{
    BoxFormat, Formats, InsuranceRange, LetterFormat, MinMax, Restrictions, RollFormat, Service,
    ServiceRange, ServiceType,
};
pub use types::{Company, DeliveryRange, Dimensions, ServiceStatus};
