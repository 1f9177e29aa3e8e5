//! Inbound request and normalized response shapes

use serde::{Deserialize, Serialize};

use super::gemini::{normalize_model_id, Content, GenerateContentRequest};

/// Inbound request body
///
/// `userQuery` and `systemPrompt` are accepted as aliases for `prompt`
/// and `systemInstruction`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(default, alias = "userQuery")]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, alias = "systemPrompt")]
    pub system_instruction: Option<String>,
}

/// Canonical field names and their accepted aliases; a body may use one of each pair
pub const FIELD_ALIASES: &[(&str, &str)] = &[("prompt", "userQuery"), ("systemInstruction", "systemPrompt")];

/// Reasons an inbound request body is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field \"{0}\" in the request")]
    MissingField(&'static str),

    #[error("Invalid field \"{field}\": {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Fields \"{field}\" and \"{alias}\" are the same field; send only one of them")]
    ConflictingFields { field: &'static str, alias: &'static str },
}

/// A validated request, ready for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptInput {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub model: String,
}

impl ProxyRequest {
    /// Reject objects that carry both a canonical field and its alias
    pub fn check_aliases(object: &serde_json::Map<String, serde_json::Value>) -> Result<(), ValidationError> {
        for &(field, alias) in FIELD_ALIASES {
            if object.contains_key(field) && object.contains_key(alias) {
                return Err(ValidationError::ConflictingFields { field, alias });
            }
        }
        Ok(())
    }

    /// Check required fields and resolve the model
    pub fn validate(self, default_model: &str) -> Result<PromptInput, ValidationError> {
        let prompt = match self.prompt {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err(ValidationError::MissingField("prompt")),
        };

        let system_instruction = self.system_instruction.filter(|s| !s.trim().is_empty());

        let model = match self.model.as_deref().map(str::trim) {
            None | Some("") => default_model.to_string(),
            Some(requested) => normalize_model_id(requested)
                .ok_or_else(|| ValidationError::InvalidField {
                    field: "model",
                    reason: format!("{:?} is not a valid model identifier", requested),
                })?
                .to_string(),
        };

        Ok(PromptInput {
            prompt,
            system_instruction,
            model,
        })
    }
}

impl From<&PromptInput> for GenerateContentRequest {
    fn from(input: &PromptInput) -> Self {
        Self {
            contents: vec![Content::user_text(input.prompt.clone())],
            system_instruction: input.system_instruction.clone().map(Content::text),
        }
    }
}

/// Success body: `{ "text": "..." }`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SuccessBody {
    pub text: String,
}

/// Failure marker carried in `proxyError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MethodNotAllowed,
    InvalidRequest,
    ConfigError,
    ApiCallFailed,
    EmptyResponse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::ConfigError => "CONFIG_ERROR",
            ErrorKind::ApiCallFailed => "API_CALL_FAILED",
            ErrorKind::EmptyResponse => "EMPTY_RESPONSE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure envelope shared by every error: `{ "proxyError", "detail", "upstreamStatus"? }`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// "<status> - <KIND>", e.g. "500 - CONFIG_ERROR"
    pub proxy_error: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl ErrorBody {
    pub fn new(status: u16, kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            proxy_error: format!("{} - {}", status, kind),
            detail: detail.into(),
            upstream_status: None,
        }
    }

    pub fn with_upstream_status(mut self, status: Option<u16>) -> Self {
        self.upstream_status = status;
        self
    }
}
