//! # melhor-envio-core
//!
//! Core types for the melhor-envio workspace.
//!
//! This crate holds the pieces every other crate builds on and performs no
//! network I/O itself:
//!
//! - **Credentials**: client identity plus the current OAuth2 token state
//! - **Configuration**: target environment, application identity, redirect URI
//! - **Credential sinks**: persistence hook invoked after every grant
//! - **Errors**: the single [`Error`] enum shared by the whole workspace
//!
//! ## Example
//!
//! ```rust
//! use melhor_envio_core::{AppIdentity, Credentials, Environment, SessionConfig};
//!
//! let config = SessionConfig::new(
//!     Credentials::new(1234, "client-secret").with_refresh_token("saved-refresh-token"),
//!     AppIdentity::new("Minha Loja", "dev@minhaloja.com.br"),
//! )
//! .with_environment(Environment::Production)
//! .on_credentials_changed(|creds| {
//!     // persist creds.refresh_token somewhere durable
//!     let _ = &creds.refresh_token;
//!     Ok(())
//! });
//!
//! assert!(config.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod credentials;
pub mod errors;
pub mod sink;

pub use config::{AppIdentity, Environment, SessionConfig, PRODUCTION_API_URL, SANDBOX_API_URL};
pub use credentials::Credentials;
pub use errors::{Error, Operation, Result, ValidationError};
pub use sink::{CredentialSink, FnSink, NoopSink};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::{
        AppIdentity, CredentialSink, Credentials, Environment, Error, Operation, Result,
        SessionConfig, ValidationError,
    };
}
