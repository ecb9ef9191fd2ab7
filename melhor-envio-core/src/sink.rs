//! Credential change notification.
//!
//! A session hands every freshly granted [`Credentials`] value to its
//! [`CredentialSink`] so the host application can persist it. A failing sink
//! fails the grant that produced the credentials.

use crate::credentials::Credentials;
use async_trait::async_trait;
use std::fmt;

/// Receives credentials after every successful grant.
#[async_trait]
pub trait CredentialSink: Send + Sync {
    /// Called with the new credentials while the exchange guard is held.
    async fn credentials_changed(&self, credentials: &Credentials) -> anyhow::Result<()>;
}

/// Sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl CredentialSink for NoopSink {
    async fn credentials_changed(&self, _credentials: &Credentials) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Sink backed by a synchronous closure.
pub struct FnSink<F> {
    callback: F,
}

impl<F> FnSink<F>
where
    F: Fn(&Credentials) -> anyhow::Result<()> + Send + Sync,
{
    /// Wrap a closure.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> CredentialSink for FnSink<F>
where
    F: Fn(&Credentials) -> anyhow::Result<()> + Send + Sync,
{
    async fn credentials_changed(&self, credentials: &Credentials) -> anyhow::Result<()> {
        (self.callback)(credentials)
    }
}
