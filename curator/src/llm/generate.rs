use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{transport_error, LlmError, LlmProvider, LlmRequest, LlmResponse};
use common::LlmEndpointConfig;

/// Generate-style provider (`POST /api/generate`, streaming disabled)
pub struct GenerateClient {
    api_url: String,
    model: String,
    default_max_tokens: usize,
    default_temperature: f32,
    top_p: Option<f32>,
    client: Client,
}

impl GenerateClient {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            model: model.into(),
            default_max_tokens: 500,
            default_temperature: 0.7,
            top_p: Some(0.9),
            client: Client::new(),
        }
    }

    pub fn with_defaults(mut self, max_tokens: usize, temperature: f32, top_p: Option<f32>) -> Self {
        self.default_max_tokens = max_tokens;
        self.default_temperature = temperature;
        self.top_p = top_p;
        self
    }

    pub fn from_config(config: &LlmEndpointConfig) -> Self {
        Self::new(&config.api_url, &config.model).with_defaults(
            config.max_tokens,
            config.temperature,
            config.top_p,
        )
    }
}

#[async_trait::async_trait]
impl LlmProvider for GenerateClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature.unwrap_or(self.default_temperature),
                top_p: self.top_p,
                max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            },
        };

        debug!(url = %self.api_url, model = %self.model, "generate request");

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
            warn!(%status, "generate endpoint returned error: {}", body);
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let envelope: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        Ok(LlmResponse {
            text: envelope.response.filter(|t| !t.is_empty()),
            model: envelope.model,
            usage: envelope.usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    model: Option<String>,
    usage: Option<serde_json::Value>,
}
