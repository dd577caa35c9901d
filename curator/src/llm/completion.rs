use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{transport_error, LlmError, LlmProvider, LlmRequest, LlmResponse};
use common::LlmEndpointConfig;

/// Completion-style provider (`POST /v1/completions`), text read from `choices[0].text`
pub struct CompletionClient {
    api_url: String,
    model: String,
    default_max_tokens: usize,
    default_temperature: f32,
    client: Client,
}

impl CompletionClient {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            model: model.into(),
            default_max_tokens: 200,
            default_temperature: 0.3,
            client: Client::new(),
        }
    }

    pub fn with_defaults(mut self, max_tokens: usize, temperature: f32) -> Self {
        self.default_max_tokens = max_tokens;
        self.default_temperature = temperature;
        self
    }

    pub fn from_config(config: &LlmEndpointConfig) -> Self {
        Self::new(&config.api_url, &config.model).with_defaults(config.max_tokens, config.temperature)
    }
}

#[async_trait::async_trait]
impl LlmProvider for CompletionClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            temperature: request.temperature.unwrap_or(self.default_temperature),
        };

        debug!(url = %self.api_url, model = %self.model, "completion request");

        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&self.api_url, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "completion endpoint returned error: {}", body);
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let envelope: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        let text = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.text)
            .filter(|t| !t.is_empty());

        Ok(LlmResponse {
            text,
            model: envelope.model,
            usage: envelope.usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: Option<String>,
}
