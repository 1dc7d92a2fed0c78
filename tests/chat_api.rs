//! Integration tests for the HTTP chat API.
//!
//! Each test spins up the axum router on a random port with a stub chat
//! model (no real API calls) and exercises the REST contract.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use concierge::agent::ConversationEngine;
use concierge::channels::chat_routes;
use concierge::config::EngineConfig;
use concierge::error::{LlmError, ToolError};
use concierge::llm::{ChatMessage, ChatModel, ModelResponse, ToolCall, ToolDefinition};
use concierge::store::{LibSqlStore, ThreadStore};
use concierge::tools::{Tool, ToolRegistry};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub model: pops one scripted response per call, then echoes.
struct StubModel {
    script: Mutex<Vec<Result<ModelResponse, LlmError>>>,
}

impl StubModel {
    fn replying(text: &str) -> Self {
        Self {
            script: Mutex::new(vec![Ok(ModelResponse {
                content: text.to_string(),
                tool_calls: Vec::new(),
            })]),
        }
    }

    fn scripted(script: Vec<Result<ModelResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script),
        }
    }
}

#[async_trait]
impl ChatModel for StubModel {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> Result<ModelResponse, LlmError> {
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            // Echo the last user message so multi-turn tests stay simple.
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            return Ok(ModelResponse {
                content: format!("echo: {last}"),
                tool_calls: Vec::new(),
            });
        }
        script.remove(0)
    }
}

struct ClockTool;

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "clock"
    }
    fn description(&self) -> &str {
        "Report the current time"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {}})
    }
    async fn invoke(&self, _args: serde_json::Value) -> Result<String, ToolError> {
        Ok("12:00".to_string())
    }
}

/// Start the chat API on a random port, return its base URL.
async fn start_server(model: StubModel, tools: ToolRegistry) -> String {
    let store: Arc<dyn ThreadStore> = Arc::new(LibSqlStore::new_memory().await.unwrap());
    let engine = Arc::new(ConversationEngine::new(
        Arc::new(model),
        Arc::new(tools),
        store,
        EngineConfig::default(),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = chat_routes(engine);
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn chat_turn_generates_thread_and_persists_history() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(StubModel::replying("Hello!"), ToolRegistry::new()).await;
        let client = reqwest::Client::new();

        let body: Value = client
            .post(format!("{base}/api/chat"))
            .json(&json!({"message": "hi there"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["reply"], "Hello!");
        let thread_id = body["thread_id"].as_str().unwrap().to_string();
        assert!(!thread_id.is_empty());

        let history: Value = client
            .get(format!("{base}/api/history/{thread_id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let messages = history.as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "hi there");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], "Hello!");

        let threads: Value = client
            .get(format!("{base}/api/threads"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(threads.as_array().unwrap().len(), 1);
        assert_eq!(threads[0], thread_id.as_str());
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn repeated_turns_extend_the_same_thread() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(StubModel::scripted(Vec::new()), ToolRegistry::new()).await;
        let client = reqwest::Client::new();

        for text in ["first", "second"] {
            let body: Value = client
                .post(format!("{base}/api/chat"))
                .json(&json!({"thread_id": "fixed", "message": text}))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(body["thread_id"], "fixed");
            assert_eq!(body["reply"], format!("echo: {text}"));
        }

        let history: Value = client
            .get(format!("{base}/api/history/fixed"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let contents: Vec<&str> = history
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, ["first", "echo: first", "second", "echo: second"]);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn tool_round_shows_up_in_history() {
    timeout(TEST_TIMEOUT, async {
        let script = vec![
            Ok(ModelResponse {
                content: String::new(),
                tool_calls: vec![ToolCall {
                    id: "call_1".into(),
                    name: "clock".into(),
                    arguments: json!({}),
                }],
            }),
            Ok(ModelResponse {
                content: "It is 12:00.".to_string(),
                tool_calls: Vec::new(),
            }),
        ];
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(ClockTool)).unwrap();
        let base = start_server(StubModel::scripted(script), tools).await;
        let client = reqwest::Client::new();

        let body: Value = client
            .post(format!("{base}/api/chat"))
            .json(&json!({"thread_id": "clocked", "message": "what time is it?"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["reply"], "It is 12:00.");

        let history: Value = client
            .get(format!("{base}/api/history/clocked"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let messages = history.as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["role"], "tool");
        assert_eq!(messages[1]["tool_call_id"], "call_1");
        assert_eq!(messages[1]["content"], "12:00");
        assert_eq!(messages[2]["content"], "It is 12:00.");
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn empty_message_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(StubModel::replying("unused"), ToolRegistry::new()).await;
        let response = reqwest::Client::new()
            .post(format!("{base}/api/chat"))
            .json(&json!({"message": "   "}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn model_failure_maps_to_bad_gateway_and_persists_nothing() {
    timeout(TEST_TIMEOUT, async {
        let script = vec![Err(LlmError::RequestFailed {
            provider: "openai".into(),
            reason: "boom".into(),
        })];
        let base = start_server(StubModel::scripted(script), ToolRegistry::new()).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/api/chat"))
            .json(&json!({"thread_id": "doomed", "message": "hello"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);

        let history: Value = client
            .get(format!("{base}/api/history/doomed"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(history.as_array().unwrap().is_empty());
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn health_endpoint_responds() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(StubModel::replying("unused"), ToolRegistry::new()).await;
        let response = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "ok");
    })
    .await
    .unwrap();
}
