//! Request/response log summaries

mod request_log;

pub use request_log::*;
