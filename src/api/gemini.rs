//! Gemini generateContent API type definitions

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static MODEL_ID_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Validate a model identifier for use in the request path
///
/// Accepts a bare id ("gemini-2.5-flash") or a resource name
/// ("models/gemini-2.5-flash") and returns the bare id.
pub fn normalize_model_id(model: &str) -> Option<&str> {
    let pattern = MODEL_ID_PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("model id pattern is valid"));

    let id = model.trim();
    let id = id.strip_prefix("models/").unwrap_or(id);
    if id.len() > 128 || !pattern.is_match(id) {
        return None;
    }
    Some(id)
}

/// generateContent request body
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

/// A turn of content, in requests and in candidates
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn holding a single text part
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// A role-less content holding a single text part (system instructions)
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

/// Content part. Only text parts are produced; non-text parts in
/// responses (function calls, inline data) deserialize with `text: None`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// generateContent success response
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all text parts joined
    ///
    /// Returns `None` when there is no candidate or it carries no text.
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Best available explanation for a response without text
    pub fn empty_reason(&self) -> Option<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            return Some(format!("prompt blocked: {}", reason));
        }
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_ref())
            .map(|reason| format!("finish reason: {}", reason))
    }
}

/// A single generated candidate
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Feedback about the prompt (e.g., if it was blocked)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error body returned with non-success statuses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
