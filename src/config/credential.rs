//! Upstream API key, held once per process

use std::fmt;

/// Keys shorter than this are not scrubbed from text; the matches would be ordinary words
const MIN_REDACT_LEN: usize = 8;

/// Secret API key for the upstream provider
///
/// `Debug` and `Display` never print the value. Use [`Credential::expose`]
/// only where the key is placed on the outbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key; empty or whitespace-only values are treated as absent
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Read the key from an environment variable
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(Self::new)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Replace every occurrence of the key in `text`
    pub fn redact(&self, text: &str) -> String {
        if self.0.chars().count() < MIN_REDACT_LEN {
            return text.to_string();
        }
        text.replace(&self.0, "[REDACTED]")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
