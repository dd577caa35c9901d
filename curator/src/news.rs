use common::{Article, NewsConfig};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Failures of the news provider, already phrased for the end user.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("NEWS_API_KEY is not configured")]
    MissingApiKey,

    #[error("Invalid API key for News API")]
    InvalidApiKey,

    #[error("News API rate limit exceeded")]
    RateLimited,

    #[error("News API error: {0}")]
    Provider(String),

    #[error("News API error: {0}")]
    Transport(String),

    #[error("News API error: invalid response body: {0}")]
    Decode(String),

    #[error("Invalid News API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Source of article lists. Every call is a fresh pass-through to the provider.
#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    /// Latest articles for a topic, newest first
    async fn fetch_topic(&self, topic: &str) -> Result<Vec<Article>, NewsError>;

    /// Articles matching a keyword, most relevant first
    async fn search(&self, keyword: &str) -> Result<Vec<Article>, NewsError>;
}

/// NewsAPI `/everything` client
pub struct NewsApiClient {
    base_url: String,
    api_key: Option<String>,
    language: String,
    page_size: u32,
    search_page_size: u32,
    client: Client,
}

impl NewsApiClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let defaults = NewsConfig::default();
        Self {
            base_url: base_url.into(),
            api_key,
            language: defaults.language,
            page_size: defaults.page_size,
            search_page_size: defaults.search_page_size,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &NewsConfig) -> Self {
        Self {
            language: config.language.clone(),
            page_size: config.page_size,
            search_page_size: config.search_page_size,
            ..Self::new(config.base_url.clone(), config.resolve_api_key())
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> Result<Url, NewsError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| NewsError::InvalidBaseUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| NewsError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("everything");
        Ok(url)
    }

    async fn everything(
        &self,
        query: &str,
        sort_by: &str,
        page_size: u32,
    ) -> Result<Vec<Article>, NewsError> {
        let api_key = self.api_key.as_deref().ok_or(NewsError::MissingApiKey)?;
        let url = self.endpoint()?;
        let page_size = page_size.to_string();

        debug!(%url, query, sort_by, "news provider request");

        let response = self
            .client
            .get(url)
            .query(&[
                ("q", query),
                ("apiKey", api_key),
                ("language", self.language.as_str()),
                ("sortBy", sort_by),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!("news provider unreachable: {}", e);
                NewsError::Transport(e.to_string())
            })?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => return Err(NewsError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => return Err(NewsError::RateLimited),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<NewsApiResponse>(&body)
                    .ok()
                    .and_then(|r| r.message)
                    .unwrap_or_else(|| status.to_string());
                warn!(%status, "news provider rejected request: {}", message);
                return Err(NewsError::Provider(message));
            }
            _ => {}
        }

        let body: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| NewsError::Decode(e.to_string()))?;

        if body.status == "error" {
            let message = body.message.unwrap_or_else(|| "Invalid response".to_string());
            warn!(code = ?body.code, "news provider returned error status: {}", message);
            return Err(NewsError::Provider(message));
        }

        let articles = body.articles.unwrap_or_default();
        debug!(
            total = ?body.total_results,
            returned = articles.len(),
            "news provider response"
        );
        Ok(articles)
    }
}

#[async_trait::async_trait]
impl NewsProvider for NewsApiClient {
    async fn fetch_topic(&self, topic: &str) -> Result<Vec<Article>, NewsError> {
        self.everything(topic, "publishedAt", self.page_size).await
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Article>, NewsError> {
        self.everything(keyword, "relevancy", self.search_page_size).await
    }
}

// NewsAPI envelope; error responses reuse it with `code` and `message`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    #[serde(default)]
    status: String,
    total_results: Option<u64>,
    articles: Option<Vec<Article>>,
    code: Option<String>,
    message: Option<String>,
}
