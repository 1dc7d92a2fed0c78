//! Web search tool backed by the Serper API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ToolError;
use crate::tools::tool::{Tool, require_str_arg};

const SERPER_URL: &str = "https://google.serper.dev/search";

/// Maximum organic results folded into the tool output.
const MAX_RESULTS: usize = 5;

/// `search` — query the web via Serper and return a text summary of the
/// top organic results.
pub struct SearchTool {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
}

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Deserialize)]
struct SerperResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SearchTool {
    pub fn new(api_key: SecretString) -> Self {
        Self::with_endpoint(api_key, SERPER_URL)
    }

    /// Endpoint override for tests.
    pub fn with_endpoint(api_key: SecretString, endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: endpoint.to_string(),
        }
    }

    fn failed(&self, reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            name: "search".to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the Internet using Serper"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "q": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["q"]
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let query = require_str_arg(self.name(), &args, "q")?;
        tracing::debug!(query, "Running web search");

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", self.api_key.expose_secret())
            .json(&serde_json::json!({"q": query}))
            .send()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.failed(format!("Serper returned HTTP {status}: {body}")));
        }

        let parsed: SerperResponse = response
            .json()
            .await
            .map_err(|e| self.failed(format!("invalid Serper response: {e}")))?;

        Ok(format_results(query, &parsed))
    }
}

fn format_results(query: &str, response: &SerperResponse) -> String {
    if response.organic.is_empty() {
        return format!("No results found for \"{query}\".");
    }

    let mut out = String::new();
    for result in response.organic.iter().take(MAX_RESULTS) {
        out.push_str(&format!(
            "{}\n{}\n{}\n\n",
            result.title, result.link, result.snippet
        ));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_organic_results() {
        let response = SerperResponse {
            organic: vec![
                SerperResult {
                    title: "Rust Programming Language".into(),
                    link: "https://www.rust-lang.org".into(),
                    snippet: "A language empowering everyone.".into(),
                },
                SerperResult {
                    title: "Rust (game)".into(),
                    link: "https://rust.facepunch.com".into(),
                    snippet: "Survival game.".into(),
                },
            ],
        };
        let text = format_results("rust", &response);
        assert!(text.starts_with("Rust Programming Language\n"));
        assert!(text.contains("https://rust.facepunch.com"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn empty_results_report_no_matches() {
        let response = SerperResponse { organic: vec![] };
        assert_eq!(
            format_results("xyzzy", &response),
            "No results found for \"xyzzy\"."
        );
    }

    #[test]
    fn caps_results_at_limit() {
        let response = SerperResponse {
            organic: (0..10)
                .map(|i| SerperResult {
                    title: format!("result {i}"),
                    link: String::new(),
                    snippet: String::new(),
                })
                .collect(),
        };
        let text = format_results("many", &response);
        assert!(text.contains("result 4"));
        assert!(!text.contains("result 5"));
    }

    #[tokio::test]
    async fn rejects_missing_query() {
        let tool = SearchTool::new(SecretString::from("test-key"));
        let err = tool.invoke(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters { .. }));
    }
}
