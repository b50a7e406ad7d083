//! Tool-invocation protocol over child-process stdio (JSON-RPC 2.0 based).
//!
//! This crate speaks both sides of the protocol:
//!
//! - [`Client`] spawns a tool host as a child process, performs the
//!   capability handshake, and issues `tools/list` / `tools/call` requests.
//! - [`Service`] is the serving loop: it exposes a [`ToolSet`] over stdio,
//!   answering one request per line.
//!
//! # Client example
//!
//! ```no_run
//! use mcp::{Client, HostConfig};
//! use std::collections::HashMap;
//!
//! # async fn example() -> mcp::Result<()> {
//! let config = HostConfig {
//!     command: "./clerk-store".to_string(),
//!     args: vec![],
//!     env: HashMap::new(),
//! };
//!
//! let client = Client::spawn(config)?;
//! client.initialize().await?;
//!
//! for tool in client.tools().await {
//!     println!("Tool: {}", tool.name);
//! }
//!
//! let result = client.call_tool("listStores", Some(serde_json::json!({}))).await?;
//! client.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod protocol;
mod service;

pub use client::{Client, HostConfig, MAX_OUTPUT_SIZE};
pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, RequestId,
    ServerCapabilities, ServerInfo, Tool, ToolContent,
};
pub use service::{Service, ToolSet};
