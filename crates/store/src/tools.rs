//! The three store tools: catalogue, dispatch, and response formatting.

use crate::api::{NewStore, StoreApi};
use crate::config::StoreConfig;
use mcp::{CallToolResult, Error, Result, Tool, ToolSet};
use serde::Deserialize;
use serde_json::{Value, json};

/// How many search results are worth relaying to the model.
const MAX_SEARCH_RESULTS: usize = 5;

const LIST_ABSENT: &str = "No stores found or invalid merchant ID.";
const LIST_EMPTY: &str = "Merchant has no stores.";
const FIND_ABSENT: &str = "No results found or invalid request.";
const FIND_EMPTY: &str = "No matching stores found.";
const ADD_FAILED: &str = "Failed to add new store.";

#[derive(Debug, Deserialize)]
struct FindStoreParams {
    #[serde(rename = "queryText")]
    query_text: String,
}

#[derive(Debug, Deserialize)]
struct AddStoreParams {
    name: String,
    keywords: Vec<String>,
    description: String,
    #[serde(rename = "searchText")]
    search_text: String,
}

/// The fixed store tool catalogue backed by [`StoreApi`].
///
/// Handlers never fail: every upstream problem (refused connection,
/// non-2xx status, unusable body) collapses into the operation's fixed
/// negative string. The consumer is a language model; it gets prose, not
/// error codes.
pub struct StoreTools {
    api: StoreApi,
    tools: Vec<Tool>,
}

impl StoreTools {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            api: StoreApi::new(config),
            tools: catalogue(),
        }
    }

    async fn list_stores(&self) -> String {
        let body = match self.api.find_all_stores().await {
            Ok(body) => body,
            Err(_) => return LIST_ABSENT.to_string(),
        };
        let Some(stores) = body.get("data").and_then(Value::as_array) else {
            return LIST_ABSENT.to_string();
        };
        if stores.is_empty() {
            return LIST_EMPTY.to_string();
        }

        let lines = stores
            .iter()
            .filter_map(|entry| entry.get("name").and_then(Value::as_str))
            .map(|name| format!("- {name}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Stores under {}:\n{lines}", self.api.merchant_id())
    }

    async fn find_store(&self, query_text: &str) -> String {
        let body = match self.api.find_store(query_text).await {
            Ok(body) => body,
            Err(_) => return FIND_ABSENT.to_string(),
        };
        let Some(results) = body.get("data").and_then(Value::as_array) else {
            return FIND_ABSENT.to_string();
        };
        if results.is_empty() {
            return FIND_EMPTY.to_string();
        }

        let blocks = results
            .iter()
            .take(MAX_SEARCH_RESULTS)
            .map(|result| {
                let name = field_text(result.get("name"));
                let score = field_text(result.get("_additional").and_then(|a| a.get("score")));
                let description = field_text(result.get("fullOriginContent"));
                format!("Name: {name}\nScore: {score}\nDescription: {description}")
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "Top results for '{query_text}' under {}:\n\n{blocks}",
            self.api.merchant_id()
        )
    }

    async fn add_store(&self, params: AddStoreParams) -> String {
        let store = NewStore {
            name: params.name,
            keywords: params.keywords,
            full_origin_content: params.description,
            full_text_search: params.search_text,
        };
        let body = match self.api.add_store(&store).await {
            Ok(body) => body,
            Err(_) => return ADD_FAILED.to_string(),
        };
        match body.get("data").and_then(|data| data.get("id")) {
            Some(id) => format!("New store added successfully. Store ID: {}", field_text(Some(id))),
            None => ADD_FAILED.to_string(),
        }
    }
}

impl ToolSet for StoreTools {
    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let text = match name {
            "listStores" => self.list_stores().await,
            "findStore" => {
                let params: FindStoreParams = parse_params(arguments)?;
                self.find_store(&params.query_text).await
            }
            "addStore" => {
                let params: AddStoreParams = parse_params(arguments)?;
                self.add_store(params).await
            }
            other => return Err(Error::ToolNotFound(other.to_string())),
        };
        Ok(CallToolResult::text(text))
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| Error::InvalidParams(e.to_string()))
}

/// Render a response field for display. Weaviate reports scores as strings,
/// other deployments as numbers; both print bare.
fn field_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn catalogue() -> Vec<Tool> {
    vec![
        Tool {
            name: "listStores".to_string(),
            description: Some("List all stores registered under the merchant.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: "findStore".to_string(),
            description: Some(
                "Search for relevant stores under the merchant using a natural language query."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "queryText": {
                        "type": "string",
                        "description": "A natural language description of the desired product or store."
                    }
                },
                "required": ["queryText"]
            }),
        },
        Tool {
            name: "addStore".to_string(),
            description: Some("Add a new store to the merchant's database.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Full name of the store."
                    },
                    "keywords": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Keywords describing the store."
                    },
                    "description": {
                        "type": "string",
                        "description": "Full description of the store."
                    },
                    "searchText": {
                        "type": "string",
                        "description": "Preprocessed text for search indexing."
                    }
                },
                "required": ["name", "keywords", "description", "searchText"]
            }),
        },
    ]
}
