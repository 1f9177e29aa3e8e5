//! Classification of raw upstream replies

use bytes::Bytes;

use super::client::TransportError;
use crate::api::{ApiErrorResponse, GenerateContentResponse};

/// Raw upstream reply: status and undecoded body
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Bytes,
}

/// What an upstream reply means for the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// Success status with generated text
    Text(String),
    /// Success status but no usable text (no candidates, blocked prompt, ...)
    Empty { reason: Option<String> },
    /// Non-success status; `message` comes from the error payload when present
    Failed { status: u16, message: Option<String> },
}

impl UpstreamReply {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Classify the reply
    ///
    /// A success status whose body is not a generateContent response is a
    /// decode failure, not an empty result.
    pub fn outcome(&self) -> Result<UpstreamOutcome, TransportError> {
        if !self.is_success() {
            let detail = serde_json::from_slice::<ApiErrorResponse>(&self.body)
                .ok()
                .map(|e| e.error);
            if let Some(d) = &detail {
                tracing::debug!(
                    http_status = self.status,
                    code = ?d.code,
                    status = ?d.status,
                    "Upstream error payload"
                );
            }
            let message = detail
                .and_then(|d| d.message)
                .filter(|m| !m.trim().is_empty());
            return Ok(UpstreamOutcome::Failed {
                status: self.status,
                message,
            });
        }

        let response: GenerateContentResponse = serde_json::from_slice(&self.body).map_err(|e| {
            tracing::error!(
                error = %e,
                body_size = self.body.len(),
                "Upstream success response is not valid generateContent JSON"
            );
            TransportError::Decode
        })?;

        tracing::debug!(
            model_version = ?response.model_version,
            candidates = response.candidates.len(),
            "Parsed generateContent response"
        );

        Ok(match response.first_text() {
            Some(text) => UpstreamOutcome::Text(text),
            None => UpstreamOutcome::Empty {
                reason: response.empty_reason(),
            },
        })
    }
}
