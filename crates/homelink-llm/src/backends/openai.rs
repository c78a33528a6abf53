//! OpenAI-compatible chat-completion backend.
//!
//! Works against OpenAI itself or any endpoint speaking the
//! `/chat/completions` dialect. Requests are non-streaming and
//! time-bounded by the client timeout so a hung provider cannot stall the
//! bridge.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use homelink_core::config::{defaults, LlmSettings};

use crate::backend::{LlmBackend, LlmError};

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Create a config for the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: defaults::OPENAI_ENDPOINT.to_string(),
            model: defaults::LLM_MODEL.to_string(),
            timeout: Duration::from_secs(defaults::LLM_TIMEOUT_SECS),
        }
    }

    /// Set the endpoint base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&LlmSettings> for OpenAiConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            timeout: settings.timeout,
        }
    }
}

/// Chat-completion backend over HTTP.
pub struct OpenAiBackend {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiBackend {
    /// Build the backend. Fails only if the HTTP client cannot be
    /// constructed.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if self.config.api_key.is_empty() {
            return Err(LlmError::Unavailable("no API key configured".to_string()));
        }

        let url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: 300,
            temperature: 0.3,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        let choice = parsed.choices.into_iter().next().ok_or(LlmError::Api {
            status: status.as_u16(),
            body: "no choices in response".to_string(),
        })?;

        Ok(choice.message.content)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = OpenAiConfig::new("sk-test")
            .with_model("gpt-4o")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.endpoint, "https://api.openai.com/v1");
    }

    #[tokio::test]
    async fn missing_api_key_is_unavailable() {
        let backend = OpenAiBackend::new(OpenAiConfig::new("")).unwrap();
        let result = backend.complete("hello").await;
        assert!(matches!(result, Err(LlmError::Unavailable(_))));
    }

    #[test]
    fn response_schema_parses() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"intent\":\"status\"}"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "{\"intent\":\"status\"}");
    }
}
