use common::{ChatMessage, ResponseStyle, Role};

use crate::backend::CuratorBackend;

pub const GREETING: &str = "Hello! I'm your AI news assistant. Paste a headline or an article and \
                            I'll summarize it, pull out the key points and suggest questions to explore.";
pub const EMPTY_REPLY: &str = "I couldn't generate a response. Please try again.";
pub const CONNECT_ERROR: &str = "⚠️ Error: Could not connect to the local model. Make sure it is running.";

/// Append-only conversation with the local model.
/// Only the message being sent reaches the backend, never the history.
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    style: ResponseStyle,
    pending: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(ResponseStyle::default())
    }
}

impl ChatSession {
    pub fn new(style: ResponseStyle) -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::Assistant, GREETING)],
            style,
            pending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn style(&self) -> ResponseStyle {
        self.style
    }

    pub fn set_style(&mut self, style: ResponseStyle) {
        self.style = style;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Send one message. Returns the appended assistant message, or `None` when the input
    /// was blank or a request is already pending.
    pub async fn send(&mut self, backend: &dyn CuratorBackend, input: &str) -> Option<&ChatMessage> {
        let text = input.trim();
        if text.is_empty() || self.pending {
            return None;
        }

        self.messages.push(ChatMessage::new(Role::User, text));
        self.pending = true;

        let reply = match backend.chat(text, self.style).await {
            Ok(response) if response.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("chat request failed: {:#}", e);
                CONNECT_ERROR.to_string()
            }
        };

        self.pending = false;
        self.messages.push(ChatMessage::new(Role::Assistant, reply));
        self.messages.last()
    }
}

/// One chat line, e.g. `[14:05] assistant: ...`
pub fn format_message(message: &ChatMessage) -> String {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!(
        "[{}] {}: {}",
        message.created_at.with_timezone(&chrono::Local).format("%H:%M"),
        who,
        message.content
    )
}
