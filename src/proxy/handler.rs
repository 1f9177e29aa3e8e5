//! Request/response handler for the proxy

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::time::Instant;

use super::error::{error_response, ProxyError};
use super::server::ProxyState;
use crate::api::{GenerateContentRequest, ProxyRequest, SuccessBody};
use crate::stats::{format_request_log, format_response_log};
use crate::upstream::UpstreamOutcome;

/// Parse the inbound body into a request object
fn parse_body(body: &[u8]) -> Result<ProxyRequest, ProxyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProxyError::InvalidBody(
            "body is empty, expected a JSON object with a \"prompt\" field".to_string(),
        ));
    }

    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ProxyError::InvalidBody(format!("malformed JSON: {}", e)))?;
    let Some(object) = value.as_object() else {
        return Err(ProxyError::InvalidBody("expected a JSON object".to_string()));
    };
    ProxyRequest::check_aliases(object)?;

    serde_json::from_value(value).map_err(|e| ProxyError::InvalidBody(e.to_string()))
}

/// Proxy request handler
pub struct ProxyHandler {
    state: ProxyState,
}

impl ProxyHandler {
    pub fn new(state: ProxyState) -> Self {
        Self { state }
    }

    /// Handle an incoming request; always yields exactly one response
    pub async fn handle(&self, req: Request<Body>) -> Response {
        let start = Instant::now();

        match self.process(req).await {
            Ok(success) => {
                tracing::info!(
                    "{}",
                    format_response_log(
                        StatusCode::OK,
                        Some(success.text.chars().count()),
                        start.elapsed().as_millis()
                    )
                );
                (StatusCode::OK, Json(success)).into_response()
            }
            Err(err) => self.error_response(err, start),
        }
    }

    /// Run the gates in order: method, credential, payload, upstream call
    async fn process(&self, req: Request<Body>) -> Result<SuccessBody, ProxyError> {
        let method = req.method().clone();
        tracing::debug!(method = %method, path = %req.uri().path(), "Processing request");

        if method != Method::POST {
            return Err(ProxyError::MethodNotAllowed(method));
        }

        let config = &self.state.config;
        let credential = self
            .state
            .credential
            .as_ref()
            .ok_or_else(|| ProxyError::MissingCredential {
                var: config.upstream.api_key_env.clone(),
            })?;

        let body_bytes = to_bytes(req.into_body(), config.server.max_body_bytes)
            .await
            .map_err(|e| ProxyError::InvalidBody(format!("failed to read request body: {}", e)))?;

        let input = parse_body(&body_bytes)?.validate(&config.upstream.default_model)?;
        tracing::info!("{}", format_request_log(&input));

        let upstream_request = GenerateContentRequest::from(&input);
        let reply = self
            .state
            .upstream
            .generate_content(&input.model, &upstream_request, credential)
            .await?;

        match reply.outcome()? {
            UpstreamOutcome::Text(text) => Ok(SuccessBody { text }),
            UpstreamOutcome::Empty { reason } => {
                tracing::warn!(reason = ?reason, "Upstream returned no generated text");
                Err(ProxyError::EmptyResponse { reason })
            }
            UpstreamOutcome::Failed { status, message } => {
                let error_body = credential.redact(&String::from_utf8_lossy(&reply.body));
                tracing::error!(
                    status,
                    upstream = self.state.upstream.name(),
                    error_body = %error_body,
                    "Upstream returned error response"
                );
                Err(ProxyError::Upstream { status, message })
            }
        }
    }

    /// Render a failure, scrubbing the credential from the detail
    fn error_response(&self, err: ProxyError, start: Instant) -> Response {
        let status = err.status_code();

        if err.is_client_error() {
            tracing::debug!(status = %status, error = %err, "Rejected request");
        } else {
            tracing::warn!(status = %status, kind = %err.kind(), error = %err, "Request failed");
        }
        tracing::info!("{}", format_response_log(status, None, start.elapsed().as_millis()));

        let mut body = err.to_body();
        if let Some(credential) = &self.state.credential {
            body.detail = credential.redact(&body.detail);
        }
        error_response(status, body)
    }
}
