//! Wire types: the proxy's own contract and the Gemini API

mod gemini;
mod proxy;

pub use gemini::*;
pub use proxy::*;
