use std::sync::Arc;

use common::LlmEndpointConfig;
use thiserror::Error;

pub mod completion;
pub mod generate;
pub mod summarizer;

/// Core trait for local model providers. One implementation per wire shape.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one prompt and return the first generated text of the response envelope
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Model identifier sent with every request
    fn model(&self) -> &str;
}

/// Request structure for LLM generation; unset knobs fall back to the endpoint defaults
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub prompt: String,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Response from LLM generation
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    /// Generated text; `None` when the envelope carried no text
    pub text: Option<String>,
    /// Model reported by the provider, if any
    pub model: Option<String>,
    /// Usage block passed through verbatim
    pub usage: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("cannot reach local model at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("local model API error: {status}")]
    Status { status: u16, body: String },

    #[error("unexpected response from local model: {0}")]
    Decode(String),
}

impl LlmError {
    /// One sentence for the end user
    pub fn user_message(&self) -> String {
        match self {
            LlmError::Unreachable { .. } => {
                "Cannot connect to the local model instance. Please make sure it's running on the configured port.".to_string()
            }
            LlmError::Status { status: 500, .. } => {
                "The local model encountered an internal error. Please check your model configuration.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn suggestion(&self) -> &'static str {
        "Make sure your local model instance is running and accessible at the configured URL."
    }
}

pub(crate) fn transport_error(url: &str, e: reqwest::Error) -> LlmError {
    LlmError::Unreachable {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

/// Create a provider for one configured endpoint
pub fn create_llm_provider(config: &LlmEndpointConfig) -> anyhow::Result<Arc<dyn LlmProvider>> {
    match config.adapter.as_str() {
        "generate" => Ok(Arc::new(generate::GenerateClient::from_config(config))),
        "completion" => Ok(Arc::new(completion::CompletionClient::from_config(config))),
        other => anyhow::bail!("Unknown LLM adapter type: {} (expected generate or completion)", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_selects_adapter() {
        let summarize = create_llm_provider(&LlmEndpointConfig::summarize_default()).unwrap();
        assert_eq!(summarize.model(), "llama-3.2");

        let chat = create_llm_provider(&LlmEndpointConfig::chat_default()).unwrap();
        assert_eq!(chat.model(), "llama3.2:latest");

        let mut bad = LlmEndpointConfig::chat_default();
        bad.adapter = "grpc".into();
        let err = create_llm_provider(&bad).err().expect("unknown adapter");
        assert!(err.to_string().contains("grpc"));
    }

    #[test]
    fn user_messages_carry_hints() {
        let down = LlmError::Unreachable {
            url: "http://localhost:11434".into(),
            reason: "connection refused".into(),
        };
        assert!(down.user_message().contains("make sure it's running"));

        let crashed = LlmError::Status { status: 500, body: String::new() };
        assert!(crashed.user_message().contains("internal error"));

        let missing = LlmError::Status { status: 404, body: "no such model".into() };
        assert_eq!(missing.user_message(), "local model API error: 404");
        assert!(missing.suggestion().contains("running"));
    }
}
