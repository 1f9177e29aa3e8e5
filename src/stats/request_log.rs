//! Request logging formatter

use axum::http::StatusCode;

use crate::api::PromptInput;

/// Format a request log message in compact format
pub fn format_request_log(input: &PromptInput) -> String {
    let mut parts = vec![
        format!("model={}", input.model),
        format!("prompt_chars={}", input.prompt.chars().count()),
    ];

    if input.system_instruction.is_some() {
        parts.push("system".to_string());
    }

    let preview = truncate_message(&normalize_whitespace(&input.prompt));
    parts.push(format!("\"{}\"", preview));

    format!("→ {}", parts.join(" "))
}

/// Format the matching response log message
pub fn format_response_log(status: StatusCode, text_chars: Option<usize>, elapsed_ms: u128) -> String {
    match text_chars {
        Some(chars) => format!("← {} text_chars={} {}ms", status.as_u16(), chars, elapsed_ms),
        None => format!("← {} {}ms", status.as_u16(), elapsed_ms),
    }
}

/// Convert newlines and tabs to single spaces, collapse multiple spaces
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate message according to rules:
/// - If <= 100 chars: show all
/// - If > 100 chars: first 25 + " ... " + last 75
fn truncate_message(s: &str) -> String {
    const MAX_TOTAL: usize = 100;
    const PREFIX_LEN: usize = 25;
    const SUFFIX_LEN: usize = 75;
    const ELLIPSIS: &str = " ... ";

    let count = s.chars().count();
    if count <= MAX_TOTAL {
        return s.to_string();
    }

    let prefix: String = s.chars().take(PREFIX_LEN).collect();
    let suffix: String = s.chars().skip(count - SUFFIX_LEN).collect();

    format!("{}{}{}", prefix, ELLIPSIS, suffix)
}
