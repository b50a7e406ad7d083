//! Clerk runtime: the model loop and its tool boundary.
//!
//! The runtime is organized around three concepts:
//!
//! - **Backend**: a trait abstracting the language-model provider
//!   (Anthropic Messages API).
//! - **ToolHost**: the seam between the model loop and side effects;
//!   backed by a spawned tool host process in production.
//! - **Relay**: drives one user query through at most two model calls and
//!   one round of tool dispatch.
//!
//! # Example
//!
//! ```ignore
//! use mcp::HostConfig;
//! use runtime::{AnthropicBackend, McpToolHost, Relay};
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = AnthropicBackend::builder("sk-ant-api01-...", "claude-sonnet-4-20250514").build();
//! let host = McpToolHost::connect(HostConfig::for_command("./clerk-store")).await?;
//!
//! let relay = Relay::new(backend, host);
//! let answer = relay.process_query("which stores do we have?").await?;
//! println!("{answer}");
//! relay.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod model;
mod providers;
mod relay;
pub mod tools;

pub use error::{Error, Result};
pub use model::{
    Backend, Message, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolChoice, ToolResult,
    ToolSpec, Usage,
};
pub use providers::AnthropicBackend;
pub use relay::Relay;
pub use tools::{McpToolHost, ToolError, ToolHost};
