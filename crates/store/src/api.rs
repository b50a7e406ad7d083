//! HTTP client for the remote store API.

use crate::config::StoreConfig;
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Fixed budget for every outbound call. The only timeout in the system.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why an upstream call produced no usable response.
///
/// Kept distinct so the logs can tell a refused connection from a bad
/// payload; the tool layer reports the same user-facing text for all of
/// them.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network: {0}")]
    Network(String),

    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// A record to be created upstream.
#[derive(Debug, Clone, Serialize)]
pub struct NewStore {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(rename = "fullOriginContent")]
    pub full_origin_content: String,
    #[serde(rename = "fullTextSearch")]
    pub full_text_search: String,
}

/// Client for the remote store API.
///
/// Stateless: every method builds one POST with the merchant identifier
/// folded in and hands back the raw response envelope.
pub struct StoreApi {
    http: reqwest::Client,
    config: StoreConfig,
}

impl StoreApi {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// The merchant identifier requests are scoped to.
    pub fn merchant_id(&self) -> &str {
        &self.config.merchant_id
    }

    /// Fetch all records for the configured merchant.
    pub async fn find_all_stores(&self) -> Result<Value, ApiError> {
        let payload = json!({ "merchantId": self.config.merchant_id });
        self.post("findAllStores", &payload).await
    }

    /// Natural-language search under the configured merchant.
    pub async fn find_store(&self, query_text: &str) -> Result<Value, ApiError> {
        let payload = json!({
            "merchantId": self.config.merchant_id,
            "queryText": query_text,
        });
        self.post("findStore", &payload).await
    }

    /// Create a new record under the configured merchant.
    pub async fn add_store(&self, store: &NewStore) -> Result<Value, ApiError> {
        let payload = json!({
            "merchantId": self.config.merchant_id,
            "storeData": store,
        });
        self.post("addNewStore", &payload).await
    }

    async fn post(&self, endpoint: &str, payload: &Value) -> Result<Value, ApiError> {
        let base = self.config.api_base.trim_end_matches('/');
        let url = format!("{base}/{endpoint}");

        let result = self.try_post(&url, payload).await;
        if let Err(e) = &result {
            warn!(url = %url, error = %e, "store API call failed");
        }
        result
    }

    async fn try_post(&self, url: &str, payload: &Value) -> Result<Value, ApiError> {
        let response = self
            .http
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
