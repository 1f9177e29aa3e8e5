//! gemini-proxy: HTTP proxy for the Gemini generateContent API
//!
//! Features:
//! - One POST endpoint taking `{ prompt, model?, systemInstruction? }`
//! - API key held server-side, read once from the environment
//! - A single normalized error envelope for every failure

pub mod api;
pub mod config;
pub mod proxy;
pub mod stats;
pub mod upstream;

pub use config::AppConfig;
pub use proxy::{build_router, run_server, ProxyState};
