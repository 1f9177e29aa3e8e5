//! HTTP proxy server

mod error;
mod handler;
pub mod server;

pub use error::{error_response, ProxyError};
pub use handler::ProxyHandler;
pub use server::{build_router, run_server, ProxyState};
