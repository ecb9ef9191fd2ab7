//! Error types for melhor-envio.
//!
//! Every operation in the workspace returns [`Result`], whose error side is the
//! single [`Error`] enum below. Endpoint-specific rejections carry a
//! [`ValidationError`] tagged with the [`Operation`] that produced it.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The API operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// OAuth2 token grant.
    Auth,
    /// Freight quote calculation.
    Quote,
    /// Cart insertion or removal.
    Cart,
    /// Cart checkout.
    Checkout,
    /// Label generation.
    Generate,
    /// Label printing.
    Print,
    /// Service metadata lookup.
    Service,
    /// Carrier listing.
    Companies,
}

impl Operation {
    /// Short lowercase name used in messages and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Auth => "auth",
            Operation::Quote => "quote",
            Operation::Cart => "cart",
            Operation::Checkout => "checkout",
            Operation::Generate => "generate",
            Operation::Print => "print",
            Operation::Service => "service",
            Operation::Companies => "companies",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for melhor-envio operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The session was shut down (or never set up) before the call.
    #[error("Client not initialized")]
    NotInitialized,

    /// No usable authorization code or refresh token, or the API kept
    /// rejecting the bearer token after one re-authentication.
    #[error("Invalid token")]
    InvalidToken,

    /// The API rejected the request payload.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A status/body combination the operation does not model.
    #[error("{operation}: unrecognized response: {status} {body}")]
    UnrecognizedResponse {
        /// Operation that received the response.
        operation: Operation,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Network or connection failure from the HTTP transport.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A URL could not be built from the configured base.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header value contained characters HTTP does not allow.
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// The session configuration is incomplete or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The call was aborted through the session's cancellation token.
    #[error("Request cancelled")]
    Cancelled,

    /// The registered credential sink refused the new credentials.
    #[error(transparent)]
    CredentialSink(anyhow::Error),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an unrecognized-response error.
    pub fn unrecognized(operation: Operation, status: u16, body: impl Into<String>) -> Self {
        Self::UnrecognizedResponse {
            operation,
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether this is [`Error::InvalidToken`].
    #[must_use]
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Error::InvalidToken)
    }

    /// Whether this is a payload rejection.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// The HTTP status associated with the error, when one is known.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::InvalidToken => Some(401),
            Error::Validation(err) => err.status,
            Error::UnrecognizedResponse { status, .. } => Some(*status),
            Error::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Payload rejection returned by an endpoint (HTTP 422, and 400 for some
/// endpoints).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation}: {message}{}", format_fields(.errors))]
pub struct ValidationError {
    /// Operation that was rejected.
    pub operation: Operation,
    /// HTTP status the rejection arrived with.
    pub status: Option<u16>,
    /// Human readable summary.
    pub message: String,
    /// Field name to messages.
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// Create a validation error without field details.
    pub fn new(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            status: None,
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    /// Attach the HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the field → messages map.
    #[must_use]
    pub fn with_errors(mut self, errors: BTreeMap<String, Vec<String>>) -> Self {
        self.errors = errors;
        self
    }

    /// Messages reported for a single field.
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.errors.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn format_fields(errors: &BTreeMap<String, Vec<String>>) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let fields = errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");
    format!(" ({fields})")
}
