use crate::config::toml_config::LlmConfig;
use crate::domain::model::CompletionRequest;
use crate::domain::ports::LlmClient;
use crate::utils::error::{Result, ValidatorError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client. Temperature is pinned to 0 for
/// deterministic extraction.
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl AnthropicClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ValidatorError::MissingConfigError {
                field: "llm.api_key".to_string(),
            })?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: 0.0,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.user,
            }],
        };

        let start = Instant::now();
        tracing::debug!(model = %self.model, max_tokens = request.max_tokens, "Sending request to Anthropic");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Anthropic response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ValidatorError::LlmApiError {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        tracing::debug!(latency_ms = start.elapsed().as_millis() as u64, "Anthropic request completed");

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| ValidatorError::LlmResponseError {
                message: "response contains no text content block".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "Extraia os dados.".to_string(),
            user: "Escola: Colégio Modelo".to_string(),
            max_tokens: 1024,
        }
    }

    #[tokio::test]
    async fn test_complete_returns_first_text_block() {
        let server = MockServer::start();

        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "test-key")
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json_body_partial(r#"{"max_tokens": 1024, "temperature": 0.0, "system": "Extraia os dados."}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "id": "msg_01",
                    "type": "message",
                    "role": "assistant",
                    "content": [{"type": "text", "text": "{\"nome_escola\": \"Colégio Modelo\"}"}],
                    "stop_reason": "end_turn"
                }));
        });

        let client = AnthropicClient::new(server.base_url(), Some("test-key".to_string()), "claude-test");
        let text = client.complete(&request()).await.unwrap();

        api_mock.assert();
        assert_eq!(text, "{\"nome_escola\": \"Colégio Modelo\"}");
    }

    #[tokio::test]
    async fn test_complete_maps_http_errors() {
        let server = MockServer::start();

        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(401).body("{\"error\": \"invalid x-api-key\"}");
        });

        let client = AnthropicClient::new(server.base_url(), Some("bad-key".to_string()), "claude-test");
        let result = client.complete(&request()).await;

        api_mock.assert();
        match result {
            Err(ValidatorError::LlmApiError { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid x-api-key"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_without_api_key_fails_before_sending() {
        let server = MockServer::start();

        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200);
        });

        let client = AnthropicClient::new(server.base_url(), None, "claude-test");
        let result = client.complete(&request()).await;

        api_mock.assert_hits(0);
        assert!(matches!(result, Err(ValidatorError::MissingConfigError { .. })));
    }
}
