//! Push notification tool backed by the Pushover API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ToolError;
use crate::tools::tool::{Tool, require_str_arg};

const PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";

/// `send_push_notification` — deliver a short message to the user's
/// devices via Pushover.
pub struct PushTool {
    client: reqwest::Client,
    token: SecretString,
    user: SecretString,
    endpoint: String,
}

impl PushTool {
    pub fn new(token: SecretString, user: SecretString) -> Self {
        Self::with_endpoint(token, user, PUSHOVER_URL)
    }

    /// Endpoint override for tests.
    pub fn with_endpoint(token: SecretString, user: SecretString, endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            user,
            endpoint: endpoint.to_string(),
        }
    }

    fn failed(&self, reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            name: "send_push_notification".to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Tool for PushTool {
    fn name(&self) -> &str {
        "send_push_notification"
    }

    fn description(&self) -> &str {
        "Send a push notification to the user"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The notification text"
                }
            },
            "required": ["text"]
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let text = require_str_arg(self.name(), &args, "text")?;
        tracing::debug!(chars = text.len(), "Sending push notification");

        let form = [
            ("token", self.token.expose_secret()),
            ("user", self.user.expose_secret()),
            ("message", text),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.failed(format!("Pushover returned HTTP {status}: {body}")));
        }

        Ok("Push notification sent.".to_string())
    }
}
