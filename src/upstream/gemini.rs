//! reqwest-backed Gemini client

use async_trait::async_trait;
use std::time::Duration;

use super::client::{TransportError, UpstreamClient};
use super::outcome::UpstreamReply;
use crate::api::GenerateContentRequest;
use crate::config::{Credential, UpstreamConfig};

/// Header carrying the API key, as the official client libraries send it
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Direct HTTP client for the generateContent endpoint
pub struct GeminiClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Construct a client from upstream configuration
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            http_client,
        })
    }

    /// Full generateContent URL for a model
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

/// Collapse a reqwest error into a caller-safe class, logging the cause
fn transport_error(e: reqwest::Error, stage: &'static str) -> TransportError {
    let kind = if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect
    } else if e.is_decode() || e.is_body() {
        TransportError::Decode
    } else {
        TransportError::Request
    };

    tracing::error!(error = %e.without_url(), stage, kind = ?kind, "Upstream transport failure");
    kind
}

#[async_trait]
impl UpstreamClient for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        credential: &Credential,
    ) -> Result<UpstreamReply, TransportError> {
        let url = self.endpoint(model);
        tracing::debug!(url = %url, "Calling upstream generateContent");

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, credential.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(e, "send"))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, "read_body"))?;

        tracing::debug!(status, body_size = body.len(), "Received upstream response");

        Ok(UpstreamReply { status, body })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let config = UpstreamConfig {
            base_url: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            ..UpstreamConfig::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.name(), "gemini");
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = UpstreamConfig {
            base_url: format!("http://127.0.0.1:{}/v1beta", port),
            timeout_seconds: 5,
            ..UpstreamConfig::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        let request = GenerateContentRequest {
            contents: vec![crate::api::Content::user_text("hi")],
            system_instruction: None,
        };
        let credential = Credential::new("AIza-test").unwrap();

        let err = client
            .generate_content("gemini-2.5-flash", &request, &credential)
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::Connect);
    }
}
