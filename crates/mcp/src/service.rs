//! Service side: expose a set of tools over stdio.
//!
//! One JSON-RPC message per line on stdin, one response per line on stdout.
//! Anything the host wants to log must go to stderr so the protocol stream
//! stays clean.

use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcError, JsonRpcResponse,
    ListToolsResult, PROTOCOL_VERSION, RequestId, ServerCapabilities, ServerInfo, Tool,
    ToolsCapability,
};

/// A fixed catalogue of tools and their dispatch.
///
/// This is the boundary between the transport and the domain: the service
/// owns framing, handshake, and error codes; implementations own what the
/// tools actually do. [`ToolSet::call`] is only reached for well-formed
/// `tools/call` requests.
pub trait ToolSet: Send + Sync {
    /// The tool catalogue, fixed for the process lifetime.
    fn tools(&self) -> &[Tool];

    /// Dispatch one invocation.
    ///
    /// Return [`Error::ToolNotFound`] for names outside the catalogue and
    /// [`Error::InvalidParams`] when the arguments don't match the tool's
    /// declared schema; both become JSON-RPC errors instead of results.
    fn call(
        &self,
        name: &str,
        arguments: Value,
    ) -> impl Future<Output = Result<CallToolResult>> + Send;
}

/// Incoming message: request (has id) or notification (no id).
#[derive(Debug, Deserialize)]
struct IncomingMessage {
    #[allow(dead_code)]
    jsonrpc: String,
    #[serde(default)]
    id: Option<RequestId>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

/// Serving loop for a [`ToolSet`].
pub struct Service<T> {
    name: String,
    tools: T,
}

impl<T: ToolSet> Service<T> {
    pub fn new(name: impl Into<String>, tools: T) -> Self {
        Self {
            name: name.into(),
            tools,
        }
    }

    /// Serve over the process's stdin/stdout until the client disconnects
    /// or sends a `shutdown` notification.
    pub async fn run(self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve over explicit streams. Split out from [`Service::run`] so the
    /// loop can be driven by in-memory transports.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                debug!("client closed the transport");
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let message: IncomingMessage = match serde_json::from_str(trimmed) {
                Ok(m) => m,
                Err(e) => {
                    // Without an id there is nothing to correlate a reply to.
                    warn!(error = %e, "discarding unparseable message");
                    continue;
                }
            };

            let Some(id) = message.id else {
                match message.method.as_str() {
                    "notifications/initialized" => debug!("client initialized"),
                    "shutdown" => {
                        debug!("shutdown requested");
                        break;
                    }
                    other => debug!(method = other, "ignoring notification"),
                }
                continue;
            };

            let response = match self.dispatch(&message.method, message.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(error) => JsonRpcResponse::failure(id, error),
            };

            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    async fn dispatch(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> std::result::Result<Value, JsonRpcError> {
        match method {
            "initialize" => {
                let result = InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: ServerCapabilities {
                        tools: Some(ToolsCapability {
                            list_changed: false,
                        }),
                    },
                    server_info: ServerInfo {
                        name: self.name.clone(),
                        version: Some(env!("CARGO_PKG_VERSION").to_string()),
                    },
                };
                Ok(serde_json::to_value(result).unwrap_or(Value::Null))
            }
            "tools/list" => {
                let result = ListToolsResult {
                    tools: self.tools.tools().to_vec(),
                };
                Ok(serde_json::to_value(result).unwrap_or(Value::Null))
            }
            "tools/call" => {
                let params: CallToolParams = params
                    .ok_or_else(|| {
                        JsonRpcError::new(JsonRpcError::INVALID_PARAMS, "missing params")
                    })
                    .and_then(|p| {
                        serde_json::from_value(p).map_err(|e| {
                            JsonRpcError::new(JsonRpcError::INVALID_PARAMS, e.to_string())
                        })
                    })?;

                debug!(tool = %params.name, "dispatching tool call");
                let arguments = params.arguments.unwrap_or_else(|| Value::Object(Default::default()));
                let result = self
                    .tools
                    .call(&params.name, arguments)
                    .await
                    .map_err(to_rpc_error)?;

                Ok(serde_json::to_value(result).unwrap_or(Value::Null))
            }
            other => Err(JsonRpcError::new(
                JsonRpcError::METHOD_NOT_FOUND,
                format!("unknown method: {other}"),
            )),
        }
    }
}

fn to_rpc_error(error: Error) -> JsonRpcError {
    match &error {
        Error::ToolNotFound(_) | Error::InvalidParams(_) => {
            JsonRpcError::new(JsonRpcError::INVALID_PARAMS, error.to_string())
        }
        _ => JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTools {
        tools: Vec<Tool>,
    }

    impl EchoTools {
        fn new() -> Self {
            Self {
                tools: vec![Tool {
                    name: "echo".to_string(),
                    description: Some("Echo the input back".to_string()),
                    input_schema: json!({
                        "type": "object",
                        "properties": {"text": {"type": "string"}},
                        "required": ["text"]
                    }),
                }],
            }
        }
    }

    impl ToolSet for EchoTools {
        fn tools(&self) -> &[Tool] {
            &self.tools
        }

        async fn call(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
            if name != "echo" {
                return Err(Error::ToolNotFound(name.to_string()));
            }
            let text = arguments
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::InvalidParams("text is required".to_string()))?;
            Ok(CallToolResult::text(text))
        }
    }

    async fn exchange(input: &str) -> Vec<JsonRpcResponse> {
        let service = Service::new("test-host", EchoTools::new());
        let mut output = Vec::new();
        service
            .serve(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn handshake_then_list() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","clientInfo":{"name":"test","version":"0"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );
        let responses = exchange(input).await;
        assert_eq!(responses.len(), 2);

        let init: InitializeResult =
            serde_json::from_value(responses[0].clone().into_result().unwrap()).unwrap();
        assert_eq!(init.protocol_version, PROTOCOL_VERSION);
        assert_eq!(init.server_info.name, "test-host");

        let listed: ListToolsResult =
            serde_json::from_value(responses[1].clone().into_result().unwrap()).unwrap();
        assert_eq!(listed.tools.len(), 1);
        assert_eq!(listed.tools[0].name, "echo");
    }

    #[tokio::test]
    async fn call_tool_roundtrip() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"echo","arguments":{"text":"hi"}}}"#,
            "\n",
        );
        let responses = exchange(input).await;
        let result: CallToolResult =
            serde_json::from_value(responses[0].clone().into_result().unwrap()).unwrap();
        assert_eq!(result.content[0].as_text(), Some("hi"));
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#,
            "\n",
        );
        let responses = exchange(input).await;
        let err = responses[0].clone().into_result().unwrap_err();
        assert_eq!(err.code, JsonRpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_method_is_reported() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":9,"method":"resources/list"}"#,
            "\n",
        );
        let responses = exchange(input).await;
        let err = responses[0].clone().into_result().unwrap_err();
        assert_eq!(err.code, JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn shutdown_notification_ends_loop() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"shutdown"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
            "\n",
        );
        // Nothing after the shutdown notification is answered.
        let responses = exchange(input).await;
        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn garbage_lines_are_skipped() {
        let input = concat!(
            "not json at all\n",
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
            "\n",
        );
        let responses = exchange(input).await;
        assert_eq!(responses.len(), 1);
        assert!(responses[0].clone().into_result().is_ok());
    }
}
