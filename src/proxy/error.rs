//! Handler error taxonomy and its mapping onto the response envelope

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::{ErrorBody, ErrorKind, ValidationError};
use crate::upstream::TransportError;

const UPSTREAM_HINT: &str = "Check quotas, permissions, or whether the API key is valid.";

/// Every way a proxied request can fail
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Method {0} not allowed, only POST is accepted")]
    MethodNotAllowed(Method),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("The API key is not configured: environment variable {var} is not set")]
    MissingCredential { var: String },

    #[error(
        "Error calling the Gemini API (upstream status {status}): {}",
        .message.as_deref().unwrap_or(UPSTREAM_HINT)
    )]
    Upstream { status: u16, message: Option<String> },

    #[error(
        "The Gemini API returned no generated text{}",
        .reason.as_ref().map(|r| format!(" ({})", r)).unwrap_or_default()
    )]
    EmptyResponse { reason: Option<String> },

    #[error("Error calling the Gemini API: {0}. {hint}", hint = UPSTREAM_HINT)]
    Transport(#[from] TransportError),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::InvalidBody(_) | ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            ProxyError::MissingCredential { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ProxyError::EmptyResponse { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProxyError::MethodNotAllowed(_) => ErrorKind::MethodNotAllowed,
            ProxyError::InvalidBody(_) | ProxyError::Validation(_) => ErrorKind::InvalidRequest,
            ProxyError::MissingCredential { .. } => ErrorKind::ConfigError,
            ProxyError::Upstream { .. } | ProxyError::Transport(_) => ErrorKind::ApiCallFailed,
            ProxyError::EmptyResponse { .. } => ErrorKind::EmptyResponse,
        }
    }

    /// Status reported by the upstream provider, when one was received
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ProxyError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for failures caused by the caller
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.status_code().as_u16(), self.kind(), self.to_string())
            .with_upstream_status(self.upstream_status())
    }
}

/// Render an envelope with its status
pub fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    let mut response = (status, Json(body)).into_response();
    if status == StatusCode::METHOD_NOT_ALLOWED {
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static("POST"));
    }
    response
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_body())
    }
}
