//! # melhor-envio-auth
//!
//! OAuth2 session for the Melhor Envio API.
//!
//! A [`Session`] owns the credential store and wraps every outbound call in
//! the authenticated request pipeline:
//!
//! 1. inject `Accept`, `Content-Type` and the `User-Agent` built from the
//!    application identity
//! 2. refresh the access token when it is expired (expiry instant included)
//! 3. attach `Authorization: Bearer <token>` and send
//! 4. on 401, refresh once and replay the request once
//!
//! Token grants (authorization code and refresh token) are serialized by a
//! session-wide exchange guard. Requests that find the token stale while a
//! concurrent grant is running reuse its result instead of issuing a second
//! grant.
//!
//! ## Example
//!
//! ```rust,ignore
//! use melhor_envio_auth::Session;
//! use melhor_envio_core::SessionConfig;
//! use reqwest::Method;
//!
//! let session = Session::new(SessionConfig::from_env("MELHOR_ENVIO")?)?;
//! let request = session.prepare(Method::GET, "/api/v2/me")?;
//! let response = session.execute(&request).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod authorize;
mod pipeline;
mod session;
mod token;

#[cfg(test)]
mod testing;

pub use authorize::AUTHORIZE_PATH;
pub use pipeline::PreparedRequest;
pub use session::Session;
pub use token::{TokenResponse, TOKEN_PATH};

pub use tokio_util::sync::CancellationToken;
