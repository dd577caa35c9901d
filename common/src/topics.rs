use serde::Serialize;

/// A browsable news category. The `id` doubles as the provider query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const TOPICS: [Topic; 8] = [
    Topic { id: "technology", name: "Technology", icon: "💻" },
    Topic { id: "business", name: "Business", icon: "💼" },
    Topic { id: "science", name: "Science", icon: "🔬" },
    Topic { id: "health", name: "Health", icon: "🏥" },
    Topic { id: "sports", name: "Sports", icon: "⚽" },
    Topic { id: "entertainment", name: "Entertainment", icon: "🎬" },
    Topic { id: "politics", name: "Politics", icon: "🏛️" },
    Topic { id: "environment", name: "Environment", icon: "🌱" },
];

impl Topic {
    pub fn find(id: &str) -> Option<&'static Topic> {
        TOPICS.iter().find(|t| t.id.eq_ignore_ascii_case(id.trim()))
    }
}

/// Feed heading for any query string: first letter upper-cased, then " News".
pub fn feed_title(topic: &str) -> String {
    let mut chars = topic.chars();
    match chars.next() {
        Some(first) => format!("{}{} News", first.to_uppercase(), chars.as_str()),
        None => "News Feed".to_string(),
    }
}
