//! Client side: spawn a tool host process and drive it over stdio.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, RequestId, Tool,
};

/// Maximum response line size (1MB).
/// Sized for large tool outputs (search results, long descriptions).
pub const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// How to launch a tool host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl HostConfig {
    /// Launch config for a bare executable path with no arguments.
    pub fn for_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }
}

/// Handle to a running tool host process.
///
/// The child is spawned with `kill_on_drop`, so the process is reaped even
/// when the owner exits through an error path without calling
/// [`Client::shutdown`].
pub struct Client {
    process: Mutex<Child>,
    stdin: Mutex<tokio::process::ChildStdin>,
    stdout: Mutex<BufReader<tokio::process::ChildStdout>>,
    next_id: AtomicI64,
    initialized: Mutex<bool>,
    host_info: Mutex<Option<InitializeResult>>,
    tools: Mutex<Vec<Tool>>,
}

impl Client {
    /// Spawn the tool host process.
    pub fn spawn(config: HostConfig) -> Result<Self> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut process = cmd.spawn()?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("failed to capture stdin")))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("failed to capture stdout")))?;

        Ok(Self {
            process: Mutex::new(process),
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(BufReader::new(stdout)),
            next_id: AtomicI64::new(1),
            initialized: Mutex::new(false),
            host_info: Mutex::new(None),
            tools: Mutex::new(Vec::new()),
        })
    }

    /// Perform the capability handshake and discover the tool catalogue.
    ///
    /// Must be called before [`Client::call_tool`]. The catalogue is fetched
    /// once here and fixed for the life of the connection.
    pub async fn initialize(&self) -> Result<&Self> {
        let params = InitializeParams::default();
        let result: InitializeResult = self.request("initialize", Some(params)).await?;
        debug!(host = %result.server_info.name, "handshake complete");

        self.notify("notifications/initialized", None::<()>).await?;

        *self.host_info.lock().await = Some(result);
        *self.initialized.lock().await = true;

        let listed: ListToolsResult = self.request("tools/list", None::<()>).await?;
        *self.tools.lock().await = listed.tools;

        Ok(self)
    }

    /// Get host info (after initialization).
    pub async fn host_info(&self) -> Option<InitializeResult> {
        self.host_info.lock().await.clone()
    }

    /// Get the discovered tool catalogue.
    pub async fn tools(&self) -> Vec<Tool> {
        self.tools.lock().await.clone()
    }

    /// Call a tool by name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Value>,
    ) -> Result<CallToolResult> {
        if !*self.initialized.lock().await {
            return Err(Error::NotInitialized);
        }

        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };

        let result: CallToolResult = self.request("tools/call", Some(params)).await?;

        if result.is_error {
            let error_text = result
                .content
                .iter()
                .filter_map(|c| c.as_text())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(Error::ToolCallFailed(error_text));
        }

        Ok(result)
    }

    /// Check if the host process is still running.
    pub async fn is_running(&self) -> bool {
        let mut process = self.process.lock().await;
        matches!(process.try_wait(), Ok(None))
    }

    /// Shut down the host gracefully.
    pub async fn shutdown(self) -> Result<()> {
        // Send shutdown notification (best effort)
        let _ = self.notify("shutdown", None::<()>).await;

        let mut process = self.process.lock().await;
        let _ = process.kill().await;

        Ok(())
    }

    // --- Internal methods ---

    fn next_request_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn request<P, R>(&self, method: &str, params: Option<P>) -> Result<R>
    where
        P: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let id = self.next_request_id();
        let mut request = JsonRpcRequest::new(id.clone(), method);
        if let Some(p) = params {
            request = request.with_params(p);
        }

        let request_json = serde_json::to_string(&request)?;
        {
            let mut stdin = self.stdin.lock().await;
            stdin.write_all(request_json.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.flush().await?;
        }

        // No deadline here: the host owns the only timeout in the system
        // (its outbound HTTP budget), so the client waits as long as the
        // host does.
        let response = self.read_response().await?;

        if response.id != id {
            return Err(Error::InvalidResponse(format!(
                "response ID mismatch: expected {id:?}, got {:?}",
                response.id
            )));
        }

        let result_value = response.into_result()?;
        let result: R = serde_json::from_value(result_value)?;

        Ok(result)
    }

    async fn notify<P>(&self, method: &str, params: Option<P>) -> Result<()>
    where
        P: serde::Serialize,
    {
        // Notifications have no ID
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params.and_then(|p| serde_json::to_value(p).ok())
        });

        let notification_json = serde_json::to_string(&notification)?;
        {
            let mut stdin = self.stdin.lock().await;
            stdin.write_all(notification_json.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.flush().await?;
        }

        Ok(())
    }

    async fn read_response(&self) -> Result<JsonRpcResponse> {
        let mut stdout = self.stdout.lock().await;
        let mut line = String::new();

        let bytes_read = stdout.read_line(&mut line).await?;
        if bytes_read == 0 {
            return Err(Error::HostExited);
        }

        if line.len() > MAX_OUTPUT_SIZE {
            return Err(Error::OutputTooLarge {
                size: line.len(),
                max: MAX_OUTPUT_SIZE,
            });
        }

        let response: JsonRpcResponse = serde_json::from_str(&line)?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_config_for_command() {
        let config = HostConfig::for_command("./clerk-store");
        assert_eq!(config.command, "./clerk-store");
        assert!(config.args.is_empty());
        assert!(config.env.is_empty());
    }
}
