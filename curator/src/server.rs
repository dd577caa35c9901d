use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rocket::figment::Figment;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, post, routes, Build, Rocket, State};
use serde::{Deserialize, Serialize};

use common::{Article, Config, ResponseStyle, ServerConfig, Topic, TOPICS};

use crate::llm::summarizer::{self, ChatReply};
use crate::llm::{create_llm_provider, LlmProvider};
use crate::news::{NewsApiClient, NewsProvider};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub config: Arc<Config>,
    pub news: Arc<dyn NewsProvider>,
    pub news_configured: bool,
    pub summarizer: Arc<dyn LlmProvider>,
    pub chat: Arc<dyn LlmProvider>,
}

impl AppState {
    /// Wire the providers described by `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let news = NewsApiClient::from_config(&config.news);
        let news_configured = news.has_api_key();
        if !news_configured {
            tracing::warn!("News API key not configured; article requests will fail until it is set");
        }

        let summarizer = create_llm_provider(&config.llm.summarize)
            .context("invalid [llm.summarize] configuration")?;
        let chat = create_llm_provider(&config.llm.chat).context("invalid [llm.chat] configuration")?;

        tracing::info!(
            "summarize provider: {} ({}) at {}",
            config.llm.summarize.model,
            config.llm.summarize.adapter,
            config.llm.summarize.api_url
        );
        tracing::info!(
            "chat provider: {} ({}) at {}",
            config.llm.chat.model,
            config.llm.chat.adapter,
            config.llm.chat.api_url
        );

        Ok(Self {
            started_at: Utc::now(),
            config: Arc::new(config),
            news: Arc::new(news),
            news_configured,
            summarizer,
            chat,
        })
    }
}

/// JSON error body shared by every endpoint and catcher
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
            suggestion: None,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: Status,
    body: ErrorBody,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: Status::BadRequest,
            body: ErrorBody::new(message),
        }
    }

    fn internal(message: impl Into<String>, error: impl ToString) -> Self {
        Self {
            status: Status::InternalServerError,
            body: ErrorBody {
                error: Some(error.to_string()),
                ..ErrorBody::new(message)
            },
        }
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.body.suggestion = Some(suggestion.to_string());
        self
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        (self.status, Json(self.body)).respond_to(req)
    }
}

#[derive(Serialize)]
struct ArticlesResponse {
    articles: Vec<Article>,
}

#[derive(Serialize)]
struct TopicsResponse {
    topics: &'static [Topic],
}

/// Response structure for `/api/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    news_configured: bool,
    summarize_model: String,
    chat_model: String,
}

#[derive(Deserialize)]
struct SummarizeRequest {
    title: Option<String>,
    content: Option<String>,
}

#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: Option<String>,
    style: Option<String>,
}

// Missing and empty values are rejected; whitespace is passed through as-is
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

#[get("/api/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        news_configured: state.news_configured,
        summarize_model: state.summarizer.model().to_string(),
        chat_model: state.chat.model().to_string(),
    })
}

#[get("/api/topics")]
async fn topics() -> Json<TopicsResponse> {
    Json(TopicsResponse { topics: &TOPICS })
}

/// Latest articles for a topic.
#[get("/api/news?<topic>")]
async fn news(state: &State<AppState>, topic: Option<String>) -> Result<Json<ArticlesResponse>, ApiError> {
    let topic = non_empty(topic).ok_or_else(|| ApiError::bad_request("Topic parameter is required"))?;

    match state.news.fetch_topic(&topic).await {
        Ok(articles) => {
            tracing::info!(topic = %topic, count = articles.len(), "news fetched");
            Ok(Json(ArticlesResponse { articles }))
        }
        Err(e) => {
            tracing::error!(topic = %topic, "error fetching news: {}", e);
            Err(ApiError::internal("Failed to fetch news", e))
        }
    }
}

/// Keyword search across all sources, most relevant first.
#[get("/api/search?<q>")]
async fn search(state: &State<AppState>, q: Option<String>) -> Result<Json<ArticlesResponse>, ApiError> {
    let keyword = non_empty(q).ok_or_else(|| ApiError::bad_request("Query parameter is required"))?;

    state
        .news
        .search(&keyword)
        .await
        .map(|articles| Json(ArticlesResponse { articles }))
        .map_err(|e| {
            tracing::error!(keyword = %keyword, "error searching news: {}", e);
            ApiError::internal("Failed to search news", e)
        })
}

/// Summarize one article through the summarize endpoint.
/// Malformed bodies are treated like missing fields.
#[post("/api/summarize", data = "<body>")]
async fn summarize(
    state: &State<AppState>,
    body: Option<Json<SummarizeRequest>>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let (title, content) = body
        .map(Json::into_inner)
        .and_then(|b| Some((non_empty(b.title)?, non_empty(b.content)?)))
        .ok_or_else(|| ApiError::bad_request("Content and title are required"))?;

    summarizer::summarize_article(state.summarizer.as_ref(), &title, &content)
        .await
        .map(|summary| Json(SummarizeResponse { summary }))
        .map_err(|e| {
            tracing::error!("error generating summary: {}", e);
            ApiError::internal("Failed to generate summary", e.user_message())
                .with_suggestion(e.suggestion())
        })
}

async fn handle_chat(state: &AppState, body: Option<Json<ChatRequest>>) -> Result<Json<ChatReply>, ApiError> {
    let body = body.map(Json::into_inner);
    let style = body
        .as_ref()
        .and_then(|b| b.style.as_deref())
        .and_then(|s| match s.parse::<ResponseStyle>() {
            Ok(style) => Some(style),
            Err(e) => {
                tracing::debug!("{}; using default", e);
                None
            }
        })
        .unwrap_or_default();
    let message = non_empty(body.and_then(|b| b.message))
        .ok_or_else(|| ApiError::bad_request("Message is required"))?;

    summarizer::analyze_message(state.chat.as_ref(), &message, style)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("error calling local model: {}", e);
            let suggestion = e.suggestion();
            ApiError::internal(e.user_message(), e).with_suggestion(suggestion)
        })
}

#[post("/api/llama-summarize", data = "<body>")]
async fn chat(state: &State<AppState>, body: Option<Json<ChatRequest>>) -> Result<Json<ChatReply>, ApiError> {
    handle_chat(state, body).await
}

#[post("/api/chat", data = "<body>")]
async fn chat_alias(state: &State<AppState>, body: Option<Json<ChatRequest>>) -> Result<Json<ChatReply>, ApiError> {
    handle_chat(state, body).await
}

#[catch(400)]
fn bad_request() -> Json<ErrorBody> {
    Json(ErrorBody::new("Bad request"))
}

#[catch(404)]
fn not_found(req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::new(format!("No route for {} {}", req.method(), req.uri())))
}

#[catch(422)]
fn unprocessable() -> Json<ErrorBody> {
    Json(ErrorBody::new("Malformed request body"))
}

#[catch(500)]
fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody::new("Internal server error"))
}

/// Assemble the Rocket instance without launching it; tests drive it with a local client.
pub fn build_rocket(state: AppState, figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .mount(
            "/",
            routes![health, status, topics, news, search, summarize, chat, chat_alias],
        )
        .register("/", catchers![bad_request, not_found, unprocessable, internal_error])
}

/// Build and launch the Rocket server on the configured address.
///
/// This function blocks until the Rocket server shuts down and returns an error if Rocket
/// fails to start.
pub async fn launch_rocket(state: AppState, server: &ServerConfig) -> Result<()> {
    let fig = rocket::Config::figment()
        .merge(("address", server.bind.clone()))
        .merge(("port", server.port));

    tracing::info!("Starting Rocket HTTP server on {}:{}", server.bind, server.port);
    build_rocket(state, fig)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
