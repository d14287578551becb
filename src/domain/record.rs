use serde::{Deserialize, Serialize};

/// One scraped unit of feed content.
///
/// Every field falls back to an empty value when the source element does not
/// carry it, so partially populated records are normal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub text: String,
    /// ISO-8601 timestamp as exposed by the page, or empty
    pub timestamp: String,
    /// Engagement labels in display order
    pub stats: Vec<String>,
    /// Content image URLs, first-seen order, no repeats
    pub images: Vec<String>,
    /// Canonical permalink, or empty
    pub url: String,
}

impl Record {
    /// Identity used for deduplication: the `(text, timestamp)` pair.
    pub fn key(&self) -> (&str, &str) {
        (&self.text, &self.timestamp)
    }

    pub fn same_entity(&self, other: &Record) -> bool {
        self.key() == other.key()
    }

    /// A record is worth keeping only if it has text or at least one image.
    pub fn has_content(&self) -> bool {
        !self.text.is_empty() || !self.images.is_empty()
    }

    /// First `max_chars` characters of the text, for log lines.
    pub fn preview(&self, max_chars: usize) -> String {
        self.text.chars().take(max_chars).collect()
    }
}
