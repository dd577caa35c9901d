use common::{feed_title, Article};

use super::card::{ArticleCard, SummaryToggle};
use crate::backend::CuratorBackend;

pub const EMPTY_FEED: &str = "No articles found for this topic.";

#[derive(Debug, Clone)]
pub enum FeedState {
    Idle,
    Loading,
    Failed(String),
    Loaded(Vec<ArticleCard>),
}

/// Articles for one topic. Each selection or retry issues exactly one fetch.
#[derive(Debug)]
pub struct FeedView {
    topic: String,
    state: FeedState,
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedView {
    pub fn new() -> Self {
        Self {
            topic: String::new(),
            state: FeedState::Idle,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn title(&self) -> String {
        feed_title(&self.topic)
    }

    pub fn cards(&self) -> &[ArticleCard] {
        match &self.state {
            FeedState::Loaded(cards) => cards,
            _ => &[],
        }
    }

    /// `"<n> articles found"`, only once loaded
    pub fn count_line(&self) -> Option<String> {
        match &self.state {
            FeedState::Loaded(cards) => Some(format!("{} articles found", cards.len())),
            _ => None,
        }
    }

    pub async fn select_topic(&mut self, backend: &dyn CuratorBackend, topic: &str) {
        let topic = self.begin_select(topic);
        let result = backend.fetch_news(&topic).await;
        self.finish_load(result);
    }

    /// Re-issue the same fetch for the current topic.
    pub async fn retry(&mut self, backend: &dyn CuratorBackend) {
        if let Some(topic) = self.begin_retry() {
            let result = backend.fetch_news(&topic).await;
            self.finish_load(result);
        }
    }

    /// First half of a selection: switch to `Loading` and return the topic to fetch.
    pub fn begin_select(&mut self, topic: &str) -> String {
        self.topic = topic.to_string();
        self.state = FeedState::Loading;
        self.topic.clone()
    }

    /// First half of a retry; `None` without a topic or while a fetch is in flight.
    pub fn begin_retry(&mut self) -> Option<String> {
        if self.topic.is_empty() || matches!(self.state, FeedState::Loading) {
            return None;
        }
        self.state = FeedState::Loading;
        Some(self.topic.clone())
    }

    /// Second half of a load: record the fetched articles or the failure.
    pub fn finish_load(&mut self, result: anyhow::Result<Vec<Article>>) {
        self.state = match result {
            Ok(articles) => {
                tracing::debug!(topic = %self.topic, count = articles.len(), "feed loaded");
                FeedState::Loaded(articles.into_iter().map(ArticleCard::new).collect())
            }
            Err(e) => {
                tracing::warn!(topic = %self.topic, "error loading feed: {:#}", e);
                FeedState::Failed(e.to_string())
            }
        };
    }

    /// Trigger the summary control of the card at `index`; `None` if there is no such card.
    pub async fn toggle_summary(
        &mut self,
        index: usize,
        backend: &dyn CuratorBackend,
    ) -> Option<SummaryToggle> {
        match &mut self.state {
            FeedState::Loaded(cards) => match cards.get_mut(index) {
                Some(card) => Some(card.toggle_summary(backend).await),
                None => None,
            },
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.title());
        match &self.state {
            FeedState::Idle => out.push_str("Select a topic to load articles.\n"),
            FeedState::Loading => out.push_str("Loading...\n"),
            FeedState::Failed(message) => {
                out.push_str(&format!("Error: {}\n(retry to load again)\n", message));
            }
            FeedState::Loaded(cards) if cards.is_empty() => {
                out.push_str("0 articles found\n");
                out.push_str(EMPTY_FEED);
                out.push('\n');
            }
            FeedState::Loaded(cards) => {
                out.push_str(&format!("{} articles found\n", cards.len()));
                for (i, card) in cards.iter().enumerate() {
                    out.push_str(&format!("\n#{} {}\n", i + 1, card.render()));
                }
            }
        }
        out
    }
}
