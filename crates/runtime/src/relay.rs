//! The per-query relay loop.

use crate::model::{Backend, Message, ModelRequest, ToolChoice, ToolResult};
use crate::tools::{ToolError, ToolHost};
use tracing::debug;

/// Drives one user query through at most two model calls and one round of
/// tool dispatch.
///
/// Each query starts from an empty message list; nothing is carried across
/// queries. Within a query everything is strictly sequential: the second
/// model call never starts before every tool result from the first round
/// has been appended.
pub struct Relay<B, H> {
    backend: B,
    host: H,
}

impl<B: Backend, H: ToolHost> Relay<B, H> {
    pub fn new(backend: B, host: H) -> Self {
        Self { backend, host }
    }

    /// The discovered tool catalogue.
    pub fn tools(&self) -> &[crate::model::ToolSpec] {
        self.host.specs()
    }

    /// Process one query to a final printable answer.
    ///
    /// Round one attaches the full tool catalogue with automatic tool
    /// selection. If the model answers directly, that text is the answer.
    /// Otherwise every requested call is validated and then dispatched in
    /// the order the model emitted them, and a second, tool-free model
    /// call produces the answer. A tool call requested inside the second
    /// response is not serviced.
    pub async fn process_query(&self, query: &str) -> crate::Result<String> {
        let mut messages = vec![Message::user(query)];

        let first = self
            .backend
            .call(ModelRequest {
                messages: &messages,
                tools: self.host.specs(),
                tool_choice: ToolChoice::Auto,
            })
            .await?;

        let calls = first.message.tool_calls();
        if calls.is_empty() {
            return Ok(first.message.text());
        }
        debug!(calls = calls.len(), "model requested tools");
        messages.push(first.message);

        // Reject the whole batch before touching the host: a malformed
        // argument payload fails the query with zero tools invoked.
        for call in &calls {
            if !call.input.is_object() {
                return Err(ToolError::InvalidInput(format!(
                    "arguments for {} are not a JSON object",
                    call.name
                ))
                .into());
            }
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            let output = self.host.invoke(call).await?;
            debug!(tool = %call.name, "tool call completed");
            results.push(ToolResult {
                tool_call_id: call.id.clone(),
                content: output,
            });
        }
        messages.push(Message::tool_results(results));

        let second = self
            .backend
            .call(ModelRequest {
                messages: &messages,
                tools: &[],
                tool_choice: ToolChoice::None,
            })
            .await?;

        Ok(second.message.text())
    }

    /// Tear down the transport session.
    pub async fn shutdown(self) {
        self.host.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelError, ModelResponse, Part, Role, ToolCall, ToolSpec, Usage};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct SeenRequest {
        tools_attached: bool,
        message_count: usize,
    }

    struct ScriptedBackend {
        responses: Mutex<VecDeque<Message>>,
        seen: Mutex<Vec<SeenRequest>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Message>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<SeenRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Backend for ScriptedBackend {
        async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
            self.seen.lock().unwrap().push(SeenRequest {
                tools_attached: !request.tools.is_empty(),
                message_count: request.messages.len(),
            });
            let message = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ModelError::Api("script exhausted".into()))?;
            Ok(ModelResponse {
                message,
                usage: Usage::default(),
            })
        }
    }

    struct RecordingHost {
        specs: Vec<ToolSpec>,
        invoked: Mutex<Vec<String>>,
    }

    impl RecordingHost {
        fn new() -> Self {
            Self {
                specs: vec![ToolSpec {
                    name: "listStores".into(),
                    description: "List stores".into(),
                    schema: json!({"type": "object", "properties": {}}),
                }],
                invoked: Mutex::new(Vec::new()),
            }
        }

        fn invoked(&self) -> Vec<String> {
            self.invoked.lock().unwrap().clone()
        }
    }

    impl ToolHost for RecordingHost {
        fn specs(&self) -> &[ToolSpec] {
            &self.specs
        }

        async fn invoke(&self, call: &ToolCall) -> Result<String, ToolError> {
            self.invoked.lock().unwrap().push(call.name.clone());
            Ok(format!("result of {}", call.name))
        }

        async fn shutdown(self) {}
    }

    fn tool_call_message(calls: &[(&str, &str, Value)]) -> Message {
        Message {
            role: Role::Assistant,
            parts: calls
                .iter()
                .map(|(id, name, input)| {
                    Part::ToolCall(ToolCall {
                        id: id.to_string(),
                        name: name.to_string(),
                        input: input.clone(),
                    })
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn direct_answer_makes_exactly_one_model_call() {
        let backend = ScriptedBackend::new(vec![Message::assistant("just an answer")]);
        let host = RecordingHost::new();
        let relay = Relay::new(backend, host);

        let answer = relay.process_query("hello").await.unwrap();
        assert_eq!(answer, "just an answer");
        assert_eq!(relay.backend.seen().len(), 1);
        assert!(relay.host.invoked().is_empty());
    }

    #[tokio::test]
    async fn tool_round_dispatches_in_order_then_calls_again() {
        let backend = ScriptedBackend::new(vec![
            tool_call_message(&[
                ("c1", "listStores", json!({})),
                ("c2", "findStore", json!({"queryText": "coffee"})),
            ]),
            Message::assistant("final answer"),
        ]);
        let host = RecordingHost::new();
        let relay = Relay::new(backend, host);

        let answer = relay.process_query("what stores?").await.unwrap();
        assert_eq!(answer, "final answer");
        assert_eq!(relay.host.invoked(), ["listStores", "findStore"]);

        let seen = relay.backend.seen();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].tools_attached);
        assert!(!seen[1].tools_attached);
        // user query, assistant tool calls, tool results
        assert_eq!(seen[1].message_count, 3);
    }

    #[tokio::test]
    async fn malformed_arguments_abort_before_any_dispatch() {
        let backend = ScriptedBackend::new(vec![tool_call_message(&[
            ("c1", "listStores", json!({})),
            ("c2", "findStore", json!("not an object")),
        ])]);
        let host = RecordingHost::new();
        let relay = Relay::new(backend, host);

        let err = relay.process_query("what stores?").await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Tool(ToolError::InvalidInput(_))
        ));
        assert!(relay.host.invoked().is_empty());
        assert_eq!(relay.backend.seen().len(), 1);
    }

    #[tokio::test]
    async fn second_round_tool_calls_are_not_serviced() {
        let mut second = tool_call_message(&[("c9", "listStores", json!({}))]);
        second.parts.push(Part::Text("done anyway".into()));
        let backend = ScriptedBackend::new(vec![
            tool_call_message(&[("c1", "listStores", json!({}))]),
            second,
        ]);
        let host = RecordingHost::new();
        let relay = Relay::new(backend, host);

        let answer = relay.process_query("q").await.unwrap();
        assert_eq!(answer, "done anyway");
        // Only the first round's call was dispatched.
        assert_eq!(relay.host.invoked(), ["listStores"]);
        assert_eq!(relay.backend.seen().len(), 2);
    }

    #[tokio::test]
    async fn tool_failure_is_fatal_to_the_query() {
        struct FailingHost(Vec<ToolSpec>);
        impl ToolHost for FailingHost {
            fn specs(&self) -> &[ToolSpec] {
                &self.0
            }
            async fn invoke(&self, _call: &ToolCall) -> Result<String, ToolError> {
                Err(ToolError::Execution("host died".into()))
            }
            async fn shutdown(self) {}
        }

        let backend =
            ScriptedBackend::new(vec![tool_call_message(&[("c1", "listStores", json!({}))])]);
        let relay = Relay::new(backend, FailingHost(Vec::new()));
        assert!(relay.process_query("q").await.is_err());
    }
}
