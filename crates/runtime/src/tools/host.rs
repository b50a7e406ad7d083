//! Tool host trait.

use crate::model::{ToolCall, ToolSpec};
use crate::tools::ToolError;
use std::future::Future;

/// Trait for tool execution hosts.
///
/// Implementations provide tool specifications and execute tool calls.
/// This is the boundary between the model loop and side effects.
pub trait ToolHost: Send + Sync {
    /// Get available tool specifications.
    fn specs(&self) -> &[ToolSpec];

    /// Execute a tool call, returning the host's text for the model.
    fn invoke(&self, call: &ToolCall) -> impl Future<Output = Result<String, ToolError>> + Send;

    /// Release whatever the host holds (processes, connections).
    fn shutdown(self) -> impl Future<Output = ()> + Send;
}
