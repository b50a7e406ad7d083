//! Language-model provider adapters.
//!
//! Each provider implements the backend trait for its specific API.

mod anthropic;

pub use anthropic::AnthropicBackend;
