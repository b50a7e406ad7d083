//! Tool host backed by a spawned tool-host process.

use super::{ToolError, ToolHost};
use crate::model::{ToolCall, ToolSpec};
use mcp::{Client, HostConfig, Tool};
use serde_json::Value;
use tracing::debug;

/// Tool host that forwards calls to a child process over the transport.
pub struct McpToolHost {
    client: Client,
    specs: Vec<ToolSpec>,
}

impl McpToolHost {
    /// Spawn the host process, handshake, and cache its tool catalogue.
    ///
    /// The catalogue is discovered exactly once; it stays fixed for the
    /// life of this value.
    pub async fn connect(config: HostConfig) -> crate::Result<Self> {
        let client = Client::spawn(config)?;
        client.initialize().await?;
        let specs: Vec<ToolSpec> = client.tools().await.into_iter().map(spec_from).collect();
        debug!(tools = specs.len(), "tool catalogue discovered");
        Ok(Self { client, specs })
    }
}

fn spec_from(tool: Tool) -> ToolSpec {
    ToolSpec {
        name: tool.name,
        description: tool.description.unwrap_or_default(),
        schema: tool.input_schema,
    }
}

impl ToolHost for McpToolHost {
    fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    async fn invoke(&self, call: &ToolCall) -> Result<String, ToolError> {
        if !matches!(call.input, Value::Object(_)) {
            return Err(ToolError::InvalidInput(format!(
                "arguments for {} are not a JSON object",
                call.name
            )));
        }

        let result = self
            .client
            .call_tool(&call.name, Some(call.input.clone()))
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        Ok(result
            .content
            .iter()
            .filter_map(|c| c.as_text())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn shutdown(self) {
        let _ = self.client.shutdown().await;
    }
}
