//! Anthropic Messages API backend.

use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolChoice,
    ToolSpec, Usage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ApiToolChoice>,
}

#[derive(Debug, Serialize)]
struct ApiToolChoice {
    #[serde(rename = "type")]
    choice_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: ApiContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Blocks(Vec<ApiContentBlock>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize)]
struct ApiTool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ApiResponseBlock>,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating an Anthropic backend.
#[derive(Debug, Clone)]
pub struct AnthropicBackendBuilder {
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 4096,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn build(self) -> AnthropicBackend {
        AnthropicBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            max_tokens: self.max_tokens,
        }
    }
}

/// Anthropic API backend.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    pub fn builder(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> AnthropicBackendBuilder {
        AnthropicBackendBuilder::new(api_key, model)
    }

    fn role_to_api(role: Role) -> &'static str {
        match role {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn message_to_api(msg: &Message) -> ApiMessage {
        let role = Self::role_to_api(msg.role);

        // Simple case: single text part
        if msg.parts.len() == 1 {
            if let Part::Text(text) = &msg.parts[0] {
                return ApiMessage {
                    role,
                    content: ApiContent::Text(text.clone()),
                };
            }
        }

        // Complex case: multiple parts or non-text
        let blocks: Vec<ApiContentBlock> = msg
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => ApiContentBlock::Text { text: text.clone() },
                Part::ToolCall(call) => ApiContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.input.clone(),
                },
                Part::ToolResult(result) => ApiContentBlock::ToolResult {
                    tool_use_id: result.tool_call_id.clone(),
                    content: result.content.clone(),
                },
            })
            .collect();

        ApiMessage {
            role,
            content: ApiContent::Blocks(blocks),
        }
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiTool {
        ApiTool {
            name: spec.name.clone(),
            description: spec.description.clone(),
            input_schema: spec.schema.clone(),
        }
    }

    fn choice_to_api(choice: ToolChoice, has_tools: bool) -> Option<ApiToolChoice> {
        match choice {
            ToolChoice::Auto if has_tools => Some(ApiToolChoice {
                choice_type: "auto",
            }),
            _ => None,
        }
    }

    fn response_to_message(blocks: Vec<ApiResponseBlock>) -> Message {
        let parts: Vec<Part> = blocks
            .into_iter()
            .filter_map(|block| match block {
                ApiResponseBlock::Text { text } => Some(Part::Text(text)),
                ApiResponseBlock::ToolUse { id, name, input } => {
                    Some(Part::ToolCall(ToolCall { id, name, input }))
                }
                ApiResponseBlock::Unknown => None,
            })
            .collect();

        Message {
            role: Role::Assistant,
            parts,
        }
    }
}

impl std::fmt::Display for AnthropicBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anthropic({})", self.model)
    }
}

impl Backend for AnthropicBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_messages: Vec<ApiMessage> =
            request.messages.iter().map(Self::message_to_api).collect();

        let tools: Vec<ApiTool> = request.tools.iter().map(Self::tool_to_api).collect();
        let tool_choice = Self::choice_to_api(request.tool_choice, !tools.is_empty());

        let api_request = ApiRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: api_messages,
            tools,
            tool_choice,
        };

        debug!(model = %self.model, messages = request.messages.len(), "calling model");

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let message = Self::response_to_message(api_response.content);
        let usage = Usage {
            input_tokens: api_response.usage.input_tokens,
            output_tokens: api_response.usage.output_tokens,
        };

        Ok(ModelResponse { message, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ToolResult;
    use serde_json::json;

    #[test]
    fn request_with_tools_serializes_choice() {
        let messages = vec![Message::user("hi")];
        let tools = vec![ApiTool {
            name: "listStores".into(),
            description: "List stores".into(),
            input_schema: json!({"type": "object", "properties": {}}),
        }];
        let request = ApiRequest {
            model: "claude-sonnet-4-20250514".into(),
            max_tokens: 4096,
            messages: messages.iter().map(AnthropicBackend::message_to_api).collect(),
            tools,
            tool_choice: Some(ApiToolChoice {
                choice_type: "auto",
            }),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"tool_choice\":{\"type\":\"auto\"}"));
        assert!(json.contains("\"input_schema\""));
    }

    #[test]
    fn request_without_tools_omits_tool_fields() {
        let messages = vec![Message::user("hi")];
        let request = ApiRequest {
            model: "claude-sonnet-4-20250514".into(),
            max_tokens: 4096,
            messages: messages.iter().map(AnthropicBackend::message_to_api).collect(),
            tools: vec![],
            tool_choice: AnthropicBackend::choice_to_api(ToolChoice::None, false),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("tools"));
        assert!(!json.contains("tool_choice"));
    }

    #[test]
    fn tool_result_message_becomes_blocks() {
        let msg = Message::tool_results(vec![ToolResult {
            tool_call_id: "toolu_1".into(),
            content: "Stores under Tnc:\n- Acme".into(),
        }]);
        let api = AnthropicBackend::message_to_api(&msg);
        let json = serde_json::to_string(&api).unwrap();
        assert!(json.contains("\"type\":\"tool_result\""));
        assert!(json.contains("\"tool_use_id\":\"toolu_1\""));
        assert_eq!(api.role, "user");
    }

    #[test]
    fn response_blocks_become_parts() {
        let blocks = vec![
            ApiResponseBlock::Text {
                text: "Checking".into(),
            },
            ApiResponseBlock::ToolUse {
                id: "toolu_1".into(),
                name: "listStores".into(),
                input: json!({}),
            },
        ];
        let message = AnthropicBackend::response_to_message(blocks);
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.text(), "Checking");
        assert_eq!(message.tool_calls().len(), 1);
    }

    #[test]
    fn unknown_response_blocks_are_dropped() {
        let parsed: ApiResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"ok"}],
                "usage":{"input_tokens":1,"output_tokens":2}}"#,
        )
        .unwrap();
        let message = AnthropicBackend::response_to_message(parsed.content);
        assert_eq!(message.text(), "ok");
        assert_eq!(message.parts.len(), 1);
    }
}
