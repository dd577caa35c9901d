//! The seam the views talk to: either a running Curator API over HTTP,
//! or the provider adapters called in-process.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use common::{Article, ResponseStyle};

use crate::llm::summarizer;
use crate::server::AppState;

#[async_trait::async_trait]
pub trait CuratorBackend: Send + Sync {
    async fn fetch_news(&self, topic: &str) -> Result<Vec<Article>>;

    async fn summarize(&self, title: &str, content: &str) -> Result<String>;

    /// Returns the assistant text; only `message` is sent, never the history
    async fn chat(&self, message: &str, style: ResponseStyle) -> Result<String>;
}

/// Talks to the inbound API of a running server
pub struct HttpBackend {
    base: Url,
    client: Client,
}

impl HttpBackend {
    /// `base_url` may carry a path prefix, e.g. `http://host/curator`
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url).with_context(|| format!("invalid server URL: {}", base_url))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            client: Client::new(),
        })
    }

    // `path` is relative so the base prefix is kept
    fn url(&self, path: &str) -> Result<Url> {
        self.base.join(path).with_context(|| format!("cannot build URL for {}", path))
    }
}

#[derive(Deserialize)]
struct ArticlesBody {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize)]
struct SummaryBody {
    summary: String,
}

#[derive(Deserialize)]
struct ChatBody {
    #[serde(default)]
    response: String,
}

#[async_trait::async_trait]
impl CuratorBackend for HttpBackend {
    async fn fetch_news(&self, topic: &str) -> Result<Vec<Article>> {
        let response = self
            .client
            .get(self.url("api/news")?)
            .query(&[("topic", topic)])
            .send()
            .await
            .context("Failed to fetch news")?;
        if !response.status().is_success() {
            bail!("Failed to fetch news");
        }
        let body: ArticlesBody = response.json().await.context("Failed to fetch news")?;
        Ok(body.articles)
    }

    async fn summarize(&self, title: &str, content: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url("api/summarize")?)
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await
            .context("Failed to generate summary")?;
        if !response.status().is_success() {
            bail!("Failed to generate summary");
        }
        let body: SummaryBody = response.json().await.context("Failed to generate summary")?;
        Ok(body.summary)
    }

    async fn chat(&self, message: &str, style: ResponseStyle) -> Result<String> {
        let response = self
            .client
            .post(self.url("api/llama-summarize")?)
            .json(&json!({ "message": message, "style": style }))
            .send()
            .await
            .context("Failed to get AI response")?;
        if !response.status().is_success() {
            bail!("Failed to get AI response");
        }
        let body: ChatBody = response.json().await.context("Failed to get AI response")?;
        Ok(body.response)
    }
}

/// Calls the adapters directly, without a server in between
pub struct LocalBackend {
    state: AppState,
}

impl LocalBackend {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait::async_trait]
impl CuratorBackend for LocalBackend {
    async fn fetch_news(&self, topic: &str) -> Result<Vec<Article>> {
        Ok(self.state.news.fetch_topic(topic).await?)
    }

    async fn summarize(&self, title: &str, content: &str) -> Result<String> {
        if title.is_empty() || content.is_empty() {
            bail!("Content and title are required");
        }
        Ok(summarizer::summarize_article(self.state.summarizer.as_ref(), title, content).await?)
    }

    async fn chat(&self, message: &str, style: ResponseStyle) -> Result<String> {
        let reply = summarizer::analyze_message(self.state.chat.as_ref(), message, style).await?;
        Ok(reply.response)
    }
}
