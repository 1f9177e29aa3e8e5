//! Upstream client trait

use async_trait::async_trait;

use super::outcome::UpstreamReply;
use crate::api::GenerateContentRequest;
use crate::config::Credential;

/// Failure to complete the exchange with the upstream provider
///
/// Display strings are safe to show to callers; the underlying cause is
/// logged where the error is created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("the upstream API did not respond in time")]
    Timeout,

    #[error("could not connect to the upstream API")]
    Connect,

    #[error("the upstream API returned a response that could not be decoded")]
    Decode,

    #[error("the request to the upstream API failed")]
    Request,
}

/// A single generate-content call against an upstream provider
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Issue exactly one call; the reply is returned whatever its status
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        credential: &Credential,
    ) -> Result<UpstreamReply, TransportError>;

    /// Return the client name (for logging)
    fn name(&self) -> &'static str;
}
