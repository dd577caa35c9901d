//! Terminal-side state machines: topic feed, article cards and chat session.
//! They hold their own state and reach the outside world only through a `CuratorBackend`.

pub mod card;
pub mod chat;
pub mod feed;

pub use card::{ArticleCard, SummaryToggle};
pub use chat::{format_message, ChatSession};
pub use feed::{FeedState, FeedView};

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use anyhow::{bail, Result};
    use common::{Article, ArticleSource, ResponseStyle};

    use crate::backend::CuratorBackend;

    #[derive(Default)]
    struct Calls {
        failing: bool,
        silent: bool,
        articles: usize,
        topics: Vec<String>,
        summaries: usize,
        chats: Vec<(String, ResponseStyle)>,
    }

    /// Backend double that counts every call it receives
    #[derive(Default)]
    pub struct MockBackend {
        calls: Mutex<Calls>,
    }

    impl MockBackend {
        pub fn with_articles(articles: usize) -> Self {
            let backend = Self::default();
            backend.calls.lock().unwrap().articles = articles;
            backend
        }

        pub fn failing() -> Self {
            let backend = Self::default();
            backend.calls.lock().unwrap().failing = true;
            backend
        }

        /// Chat succeeds with an empty answer
        pub fn silent() -> Self {
            let backend = Self::default();
            backend.calls.lock().unwrap().silent = true;
            backend
        }

        pub fn recover(&self, articles: usize) {
            let mut calls = self.calls.lock().unwrap();
            calls.failing = false;
            calls.articles = articles;
        }

        pub fn fetch_calls(&self) -> usize {
            self.calls.lock().unwrap().topics.len()
        }

        pub fn fetched_topics(&self) -> Vec<String> {
            self.calls.lock().unwrap().topics.clone()
        }

        pub fn summarize_calls(&self) -> usize {
            self.calls.lock().unwrap().summaries
        }

        pub fn chat_requests(&self) -> Vec<(String, ResponseStyle)> {
            self.calls.lock().unwrap().chats.clone()
        }
    }

    #[async_trait::async_trait]
    impl CuratorBackend for MockBackend {
        async fn fetch_news(&self, topic: &str) -> Result<Vec<Article>> {
            let mut calls = self.calls.lock().unwrap();
            calls.topics.push(topic.to_string());
            if calls.failing {
                bail!("Failed to fetch news");
            }
            Ok((1..=calls.articles)
                .map(|i| Article {
                    source: ArticleSource { id: None, name: "Wire".into() },
                    title: format!("Article {}", i),
                    description: Some(format!("Description {}", i)),
                    url: format!("https://example.com/{}", i),
                    published_at: "2024-01-15T10:00:00Z".into(),
                    ..Default::default()
                })
                .collect())
        }

        async fn summarize(&self, title: &str, _content: &str) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            calls.summaries += 1;
            if calls.failing {
                bail!("Failed to generate summary");
            }
            Ok(format!("summary of {}", title))
        }

        async fn chat(&self, message: &str, style: ResponseStyle) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            calls.chats.push((message.to_string(), style));
            if calls.failing {
                bail!("Failed to get AI response");
            }
            if calls.silent {
                return Ok(String::new());
            }
            Ok(format!("reply to {}", message))
        }
    }
}
