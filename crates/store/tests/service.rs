//! Full host path: JSON-RPC framing → dispatch → remote API → formatted text.

use mcp::{CallToolResult, JsonRpcResponse, ListToolsResult, Service};
use serde_json::json;
use store::{StoreConfig, StoreTools};
use tokio::io::BufReader;

async fn serve(input: &str, server: &mockito::ServerGuard) -> Vec<JsonRpcResponse> {
    let tools = StoreTools::new(StoreConfig {
        api_base: server.url(),
        merchant_id: "Tnc".to_string(),
    });
    let service = Service::new("clerk-store", tools);
    let mut output = Vec::new();
    service
        .serve(BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn list_stores_end_to_end() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("POST", "/findAllStores")
        .with_status(200)
        .with_body(r#"{"data": [{"name": "Acme"}]}"#)
        .create_async()
        .await;

    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","clientInfo":{"name":"test","version":"0"}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"listStores","arguments":{}}}"#,
        "\n",
    );
    let responses = serve(input, &upstream).await;
    assert_eq!(responses.len(), 3);

    let listed: ListToolsResult =
        serde_json::from_value(responses[1].clone().into_result().unwrap()).unwrap();
    let names: Vec<_> = listed.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["listStores", "findStore", "addStore"]);

    let result: CallToolResult =
        serde_json::from_value(responses[2].clone().into_result().unwrap()).unwrap();
    assert_eq!(result.content[0].as_text(), Some("Stores under Tnc:\n- Acme"));
    assert!(!result.is_error);
}

#[tokio::test]
async fn unreachable_upstream_still_answers_in_prose() {
    // A server that was never given mocks refuses nothing, but an
    // unroutable port guarantees a connection failure.
    let tools = StoreTools::new(StoreConfig {
        api_base: "http://127.0.0.1:1/MerchantStore".to_string(),
        merchant_id: "Tnc".to_string(),
    });
    let service = Service::new("clerk-store", tools);

    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"findStore","arguments":{"queryText":"coffee"}}}"#,
        "\n",
    );
    let mut output = Vec::new();
    service
        .serve(BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    let response: JsonRpcResponse =
        serde_json::from_str(String::from_utf8(output).unwrap().lines().next().unwrap()).unwrap();
    let result: CallToolResult =
        serde_json::from_value(response.into_result().unwrap()).unwrap();
    assert_eq!(
        result.content[0].as_text(),
        Some("No results found or invalid request.")
    );
}

#[tokio::test]
async fn call_with_bad_arguments_is_a_protocol_error() {
    let upstream = mockito::Server::new_async().await;
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"findStore","arguments":{"query":"typo"}}}"#,
        "\n",
    );
    let responses = serve(input, &upstream).await;
    let err = responses[0].clone().into_result().unwrap_err();
    assert_eq!(err.code, mcp::JsonRpcError::INVALID_PARAMS);
}
