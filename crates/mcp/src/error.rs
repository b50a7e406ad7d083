//! Protocol error types.

use crate::protocol::JsonRpcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("tool host not initialized")]
    NotInitialized,

    #[error("tool host exited unexpectedly")]
    HostExited,

    #[error("failed to serialize request: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON-RPC error: {0}")]
    JsonRpc(#[from] JsonRpcError),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("invalid tool arguments: {0}")]
    InvalidParams(String),

    #[error("tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("output too large: {size} bytes (max {max})")]
    OutputTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
