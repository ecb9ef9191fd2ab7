//! Status-to-result mapping shared by every endpoint.

use melhor_envio_auth::Session;
use melhor_envio_core::{Error, Operation, Result, ValidationError};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

/// What an endpoint answers with, status by status.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Expect {
    pub operation: Operation,
    pub success: StatusCode,
    pub validation: &'static [StatusCode],
    /// Authenticated routes report a surviving 401 as `InvalidToken`; public
    /// routes leave it unrecognized.
    pub authenticated: bool,
}

impl Expect {
    pub(crate) const fn authenticated(
        operation: Operation,
        success: StatusCode,
        validation: &'static [StatusCode],
    ) -> Self {
        Self {
            operation,
            success,
            validation,
            authenticated: true,
        }
    }

    pub(crate) const fn public(operation: Operation) -> Self {
        Self {
            operation,
            success: StatusCode::OK,
            validation: &[],
            authenticated: false,
        }
    }
}

/// Body of a 422/400 rejection. Cart rejections use `error` for the field map.
#[derive(Debug, Deserialize)]
struct RejectionBody {
    #[serde(default)]
    message: String,
    #[serde(default, alias = "error")]
    errors: BTreeMap<String, Vec<String>>,
}

/// Decode the success body as `T`, or map the status to an error.
pub(crate) async fn decode<T: DeserializeOwned>(
    session: &Session,
    response: Response,
    expect: Expect,
) -> Result<T> {
    let status = response.status();
    let body = session.read_body(response).await?;
    let body = classify(status, body, expect)?;
    serde_json::from_str(&body).map_err(|err| {
        tracing::debug!(operation = %expect.operation, error = %err, "success body did not decode");
        Error::unrecognized(expect.operation, status.as_u16(), body)
    })
}

/// Like [`decode`] for endpoints whose success carries no body.
pub(crate) async fn decode_empty(session: &Session, response: Response, expect: Expect) -> Result<()> {
    let status = response.status();
    let body = session.read_body(response).await?;
    classify(status, body, expect).map(drop)
}

fn classify(status: StatusCode, body: String, expect: Expect) -> Result<String> {
    if status == expect.success {
        return Ok(body);
    }

    if expect.validation.contains(&status) {
        return match serde_json::from_str::<RejectionBody>(&body) {
            Ok(rejection) => Err(ValidationError::new(expect.operation, rejection.message)
                .with_status(status.as_u16())
                .with_errors(rejection.errors)
                .into()),
            Err(_) => Err(Error::unrecognized(expect.operation, status.as_u16(), body)),
        };
    }

    if status == StatusCode::UNAUTHORIZED && expect.authenticated {
        return Err(Error::InvalidToken);
    }

    tracing::warn!(operation = %expect.operation, status = status.as_u16(), "unrecognized response");
    Err(Error::unrecognized(expect.operation, status.as_u16(), body))
}
