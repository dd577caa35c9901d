use common::Article;

use crate::backend::CuratorBackend;

pub const SUMMARY_FAILED: &str = "Failed to generate summary. Please try again.";

/// What a summary trigger did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryToggle {
    /// A new summary was fetched, cached and shown
    Fetched,
    /// Cached summary visibility flipped; no request made
    Shown,
    Hidden,
    /// A request is already in flight; the trigger is disabled
    Busy,
    /// The request failed; nothing cached
    Failed(String),
}

/// One article in a feed with its own summary cache.
/// `shown` is independent of whether a summary is cached.
#[derive(Debug, Clone)]
pub struct ArticleCard {
    article: Article,
    summary: Option<String>,
    shown: bool,
    pending: bool,
}

impl ArticleCard {
    pub fn new(article: Article) -> Self {
        Self {
            article,
            summary: None,
            shown: false,
            pending: false,
        }
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Summary text if it is cached and currently visible
    pub fn visible_summary(&self) -> Option<&str> {
        self.summary.as_deref().filter(|_| self.shown)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn button_label(&self) -> &'static str {
        match (&self.summary, self.shown, self.pending) {
            (_, _, true) => "Summarizing...",
            (None, _, false) => "Summarize",
            (Some(_), true, false) => "Hide Summary",
            (Some(_), false, false) => "Show Summary",
        }
    }

    /// First half of a trigger. Returns the `(title, content)` to send when a request is
    /// needed and marks the card pending; otherwise flips visibility or reports `Busy`.
    pub fn begin_summary(&mut self) -> Result<(String, String), SummaryToggle> {
        if self.pending {
            return Err(SummaryToggle::Busy);
        }
        if self.summary.is_some() {
            self.shown = !self.shown;
            return Err(if self.shown { SummaryToggle::Shown } else { SummaryToggle::Hidden });
        }
        self.pending = true;
        Ok((self.article.title.clone(), self.article.summary_input().to_string()))
    }

    /// Second half of a trigger: record the outcome of the request.
    pub fn finish_summary(&mut self, result: anyhow::Result<String>) -> SummaryToggle {
        self.pending = false;
        match result {
            Ok(summary) => {
                self.summary = Some(summary);
                self.shown = true;
                SummaryToggle::Fetched
            }
            Err(e) => {
                tracing::warn!(url = %self.article.url, "error generating summary: {:#}", e);
                SummaryToggle::Failed(SUMMARY_FAILED.to_string())
            }
        }
    }

    /// Summarize on first use, then toggle the cached summary.
    pub async fn toggle_summary(&mut self, backend: &dyn CuratorBackend) -> SummaryToggle {
        match self.begin_summary() {
            Ok((title, content)) => {
                let result = backend.summarize(&title, &content).await;
                self.finish_summary(result)
            }
            Err(outcome) => outcome,
        }
    }

    /// Plain-text rendering of the card
    pub fn render(&self) -> String {
        let article = &self.article;
        let source = if article.source.name.is_empty() {
            "Unknown Source"
        } else {
            article.source.name.as_str()
        };
        let date = article
            .published()
            .map(|d| d.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| "Unknown Date".to_string());

        let mut out = format!(
            "{} · {}\n{}\n{}\n",
            source,
            date,
            article.title,
            article.description.as_deref().unwrap_or("No description available")
        );
        if !article.url.is_empty() {
            out.push_str(&format!("Read full: {}\n", article.url));
        }
        if let Some(summary) = self.visible_summary() {
            out.push_str(&format!("Summary: {}\n", summary));
        }
        out.push_str(&format!("[{}]", self.button_label()));
        out
    }
}
