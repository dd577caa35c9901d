/*!
common/src/lib.rs

Shared configuration, data types and the topic catalog for Curator.

This file provides:
- Config data structures (deserialized from TOML, every section optional)
- An async loader that merges a default file with an override file
- Environment overrides for the local model endpoint
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod topics;
pub mod types;

pub use topics::{feed_title, Topic, TOPICS};
pub use types::{Article, ArticleSource, ChatMessage, ResponseStyle, Role};

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// News provider (NewsAPI-compatible) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Base URL, the adapter appends `/everything`
    pub base_url: String,
    /// Inline credential; takes precedence over `api_key_env`
    pub api_key: Option<String>,
    /// Name of the environment variable holding the credential
    pub api_key_env: Option<String>,
    pub language: String,
    /// Page size for topic feeds
    pub page_size: u32,
    /// Page size for keyword search
    pub search_page_size: u32,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2".to_string(),
            api_key: None,
            api_key_env: Some("NEWS_API_KEY".to_string()),
            language: "en".to_string(),
            page_size: 20,
            search_page_size: 15,
        }
    }
}

impl NewsConfig {
    /// Resolve the provider credential: inline value first, then the named env var.
    /// Empty values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.api_key
            .clone()
            .or_else(|| self.api_key_env.as_deref().and_then(|name| lookup(name)))
            .filter(|k| !k.trim().is_empty())
    }
}

/// One local model endpoint. `adapter` selects the wire shape:
/// "generate" (`{ response }` envelope) or "completion" (`{ choices[0].text }`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmEndpointConfig {
    pub adapter: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub max_tokens: usize,
}

impl LlmEndpointConfig {
    /// Defaults for article summaries: completion-style server on :8080
    pub fn summarize_default() -> Self {
        Self {
            adapter: "completion".to_string(),
            api_url: "http://localhost:8080/v1/completions".to_string(),
            model: "llama-3.2".to_string(),
            temperature: 0.3,
            top_p: None,
            max_tokens: 200,
        }
    }

    /// Defaults for chat analysis: generate-style server on :11434
    pub fn chat_default() -> Self {
        Self {
            adapter: "generate".to_string(),
            api_url: "http://localhost:11434/api/generate".to_string(),
            model: "llama3.2:latest".to_string(),
            temperature: 0.7,
            top_p: Some(0.9),
            max_tokens: 500,
        }
    }
}

/// LLM top-level config: one endpoint per call site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "LlmEndpointConfig::summarize_default")]
    pub summarize: LlmEndpointConfig,
    #[serde(default = "LlmEndpointConfig::chat_default")]
    pub chat: LlmEndpointConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            summarize: LlmEndpointConfig::summarize_default(),
            chat: LlmEndpointConfig::chat_default(),
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// Both are merged over the built-in defaults (override takes precedence), so a
    /// file may set a single field of a section.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value =
            toml::Value::try_from(Config::default()).context("Failed to encode built-in defaults")?;

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Apply `LLAMA_API_URL` / `LLAMA_MODEL` from the process environment to the chat endpoint.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_with(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LLAMA_API_URL").filter(|v| !v.is_empty()) {
            self.llm.chat.api_url = url;
        }
        if let Some(model) = lookup("LLAMA_MODEL").filter(|v| !v.is_empty()) {
            self.llm.chat.model = model;
        }
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg: Config = toml::from_str("").expect("parse empty config");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.news.page_size, 20);
        assert_eq!(cfg.news.search_page_size, 15);
        assert_eq!(cfg.llm.summarize.adapter, "completion");
        assert_eq!(cfg.llm.chat.adapter, "generate");
        assert_eq!(cfg.llm.chat.top_p, Some(0.9));
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let toml = r#"
            [news]
            api_key = "abc"

            [llm.chat]
            adapter = "completion"
            api_url = "http://box:8080/v1/completions"
            model = "tiny"
            temperature = 0.1
            max_tokens = 64
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.news.language, "en");
        assert_eq!(cfg.news.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.llm.chat.model, "tiny");
        assert_eq!(cfg.llm.chat.top_p, None);
        // untouched endpoint keeps its defaults
        assert_eq!(cfg.llm.summarize.model, "llama-3.2");
    }

    #[test]
    fn api_key_resolution_order() {
        let env: HashMap<&str, &str> = [("NEWS_API_KEY", "from-env"), ("OTHER", "  ")].into();
        let lookup = |name: &str| env.get(name).map(|v| v.to_string());

        let mut news = NewsConfig::default();
        assert_eq!(news.resolve_api_key_with(lookup).as_deref(), Some("from-env"));

        news.api_key = Some("inline".into());
        assert_eq!(news.resolve_api_key_with(lookup).as_deref(), Some("inline"));

        news.api_key = None;
        news.api_key_env = Some("OTHER".into());
        assert_eq!(news.resolve_api_key_with(lookup), None);

        news.api_key_env = None;
        assert_eq!(news.resolve_api_key_with(lookup), None);
    }

    #[test]
    fn env_overrides_touch_chat_endpoint_only() {
        let mut cfg = Config::default();
        cfg.apply_overrides_with(|name| match name {
            "LLAMA_API_URL" => Some("http://gpu:11434/api/generate".into()),
            "LLAMA_MODEL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.llm.chat.api_url, "http://gpu:11434/api/generate");
        assert_eq!(cfg.llm.chat.model, "llama3.2:latest");
        assert_eq!(cfg.llm.summarize.api_url, "http://localhost:8080/v1/completions");
    }

    #[tokio::test]
    async fn override_file_wins_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_path = dir.path().join("config.default.toml");
        let override_path = dir.path().join("config.toml");

        std::fs::write(
            &default_path,
            "[server]\nport = 8000\n\n[news]\nlanguage = \"fr\"\npage_size = 10\n",
        )
        .expect("write default");
        std::fs::write(
            &override_path,
            "[news]\npage_size = 5\n\n[llm.chat]\nmodel = \"mistral\"\n",
        )
        .expect("write override");

        let cfg = Config::load_with_defaults(Some(&default_path), Some(&override_path))
            .await
            .expect("load config");
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.news.language, "fr");
        assert_eq!(cfg.news.page_size, 5);
        assert_eq!(cfg.llm.chat.model, "mistral");
        assert_eq!(cfg.llm.chat.api_url, "http://localhost:11434/api/generate");
    }

    #[tokio::test]
    async fn missing_files_fall_back_to_builtin_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let absent = dir.path().join("nope.toml");

        let cfg = Config::load_with_defaults(Some(&absent), None).await.expect("load");
        assert_eq!(cfg.server.bind, "127.0.0.1");

        assert!(Config::from_file(&absent).await.is_err());
    }
}
