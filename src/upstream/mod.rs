//! Upstream generative-text provider access

mod client;
mod gemini;
mod outcome;

pub use client::{TransportError, UpstreamClient};
pub use gemini::{GeminiClient, API_KEY_HEADER};
pub use outcome::{UpstreamOutcome, UpstreamReply};
