// Prompt building for article summaries and chat analysis
use serde::Serialize;
use tracing::info;

use common::ResponseStyle;

use super::{LlmError, LlmProvider, LlmRequest};

pub const SUMMARY_FALLBACK: &str = "Unable to generate summary";
pub const CHAT_FALLBACK: &str =
    "I apologize, but I couldn't generate a response. Please try again.";

/// Reply of the chat endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub model: String,
    pub usage: Option<serde_json::Value>,
}

pub fn article_prompt(title: &str, content: &str) -> String {
    format!(
        "You are a helpful assistant that summarizes news articles. Provide concise, informative \
         summaries that capture the key points and main ideas. Keep summaries under 150 words and \
         focus on the most important information.\n\nTitle: {}\nContent: {}\n\nSummary:",
        title, content
    )
}

pub fn analysis_prompt(message: &str, style: ResponseStyle) -> String {
    let layout = match style {
        ResponseStyle::Bullets => "Format every section as a short bullet list.",
        ResponseStyle::Paragraph => "Write every section as flowing prose paragraphs, without bullet points.",
    };

    format!(
        r#"You are an AI news analyst and summarizer. Please analyze the following news content and provide:

1. A concise summary (2-3 sentences)
2. Key points and insights
3. Any potential biases or important context
4. Relevant questions for further exploration

{}

News content: {}

Please provide a helpful, informative response:"#,
        layout, message
    )
}

/// Summarize one article. Empty model output becomes the fixed fallback text.
pub async fn summarize_article<P: LlmProvider + ?Sized>(
    provider: &P,
    title: &str,
    content: &str,
) -> Result<String, LlmError> {
    let response = provider.generate(LlmRequest::new(article_prompt(title, content))).await?;

    match response.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => {
            info!(chars = text.len(), "article summary generated");
            Ok(text.to_string())
        }
        None => Ok(SUMMARY_FALLBACK.to_string()),
    }
}

/// Analyze free-form chat input. Only the current message is sent, no history.
pub async fn analyze_message<P: LlmProvider + ?Sized>(
    provider: &P,
    message: &str,
    style: ResponseStyle,
) -> Result<ChatReply, LlmError> {
    let response = provider.generate(LlmRequest::new(analysis_prompt(message, style))).await?;

    Ok(ChatReply {
        response: response.text.unwrap_or_else(|| CHAT_FALLBACK.to_string()),
        model: response.model.unwrap_or_else(|| provider.model().to_string()),
        usage: response.usage,
    })
}
