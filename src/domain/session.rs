use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Record;

/// Which feed of a profile a pass crawls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Posts,
    Replies,
}

impl FeedKind {
    pub const ALL: [FeedKind; 2] = [FeedKind::Posts, FeedKind::Replies];

    /// Plural label used in logs and section headings
    pub fn label(self) -> &'static str {
        match self {
            FeedKind::Posts => "posts",
            FeedKind::Replies => "replies",
        }
    }

    /// Singular, capitalised label used in record headings
    pub fn item_label(self) -> &'static str {
        match self {
            FeedKind::Posts => "Post",
            FeedKind::Replies => "Reply",
        }
    }

    /// Profile page URL for this feed.
    pub fn url(self, base_url: &str, target: &str) -> String {
        let profile = format!("{}/@{}", base_url.trim_end_matches('/'), target);
        match self {
            FeedKind::Posts => profile,
            FeedKind::Replies => format!("{profile}/replies"),
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// State for one invocation against one profile.
///
/// Both collections are append-only: records keep their insertion order and
/// are never modified or removed once stored.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    target: String,
    scroll_budget: usize,
    posts: Vec<Record>,
    replies: Vec<Record>,
}

impl CrawlSession {
    pub fn new(target: impl Into<String>, scroll_budget: usize) -> Self {
        Self {
            target: target.into(),
            scroll_budget,
            posts: Vec::new(),
            replies: Vec::new(),
        }
    }

    /// Rebuild a session from previously collected records.
    pub fn restore(
        target: impl Into<String>,
        scroll_budget: usize,
        posts: Vec<Record>,
        replies: Vec<Record>,
    ) -> Self {
        Self {
            target: target.into(),
            scroll_budget,
            posts,
            replies,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn scroll_budget(&self) -> usize {
        self.scroll_budget
    }

    pub fn posts(&self) -> &[Record] {
        &self.posts
    }

    pub fn replies(&self) -> &[Record] {
        &self.replies
    }

    pub fn records(&self, kind: FeedKind) -> &[Record] {
        match kind {
            FeedKind::Posts => &self.posts,
            FeedKind::Replies => &self.replies,
        }
    }

    pub fn append(&mut self, kind: FeedKind, record: Record) {
        match kind {
            FeedKind::Posts => self.posts.push(record),
            FeedKind::Replies => self.replies.push(record),
        }
    }

    pub fn total(&self) -> usize {
        self.posts.len() + self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
