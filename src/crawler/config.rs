use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the scroll-and-extract crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Site root the profile feeds live under
    pub base_url: String,

    /// How long to wait for feed content to render, in seconds (default: 30)
    pub ready_timeout_secs: u64,

    /// Poll interval while waiting for content, in milliseconds (default: 2000)
    pub ready_poll_interval_ms: u64,

    /// Page markup must be longer than this to count as loaded (default: 1000)
    pub min_markup_len: usize,

    /// Pause after navigating to a feed, in milliseconds (default: 5000)
    pub initial_settle_ms: u64,

    /// Pause after scrolling an element into view, in milliseconds (default: 1000)
    pub element_settle_ms: u64,

    /// Pause after scrolling to the bottom, in milliseconds (default: 3000)
    pub scroll_settle_ms: u64,

    /// Pause after the second-chance nudge scroll, in milliseconds (default: 2000)
    pub nudge_settle_ms: u64,

    /// Selectors whose presence signals rendered feed content, in priority order
    pub ready_selectors: Vec<String>,

    /// Selectors for individual feed entries, in priority order
    pub feed_selectors: Vec<String>,

    /// Selector for the text node inside an entry
    pub text_selector: String,

    /// Selector for the node carrying the `datetime` attribute
    pub timestamp_selector: String,

    /// Selector for engagement labels
    pub stats_selector: String,

    /// Selector for candidate images
    pub image_selector: String,

    /// Selector for the permalink anchor
    pub link_selector: String,

    /// URL fragments that mean the page redirected to a login or block wall
    pub blocked_url_markers: Vec<String>,

    /// Save a screenshot and page source when extraction starts
    pub save_debug_snapshots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        let feed_selectors = vec![
            "article".to_string(),
            "div[role='article']".to_string(),
            "div[data-pressable-container='true']".to_string(),
            "div._aabd._aa8k._al3l".to_string(),
            "div[style*='flex-direction: column']".to_string(),
        ];

        let mut ready_selectors = feed_selectors.clone();
        ready_selectors.push("span[dir='auto']".to_string());
        ready_selectors.push("img:not([alt='Profile picture'])".to_string());

        Self {
            base_url: "https://www.threads.net".to_string(),
            ready_timeout_secs: 30,
            ready_poll_interval_ms: 2000,
            min_markup_len: 1000,
            initial_settle_ms: 5000,
            element_settle_ms: 1000,
            scroll_settle_ms: 3000,
            nudge_settle_ms: 2000,
            ready_selectors,
            feed_selectors,
            text_selector: "span[dir='auto']".to_string(),
            timestamp_selector: "time".to_string(),
            stats_selector: "span.x193iq5w".to_string(),
            image_selector: "img:not([alt='Profile picture'])".to_string(),
            link_selector: "a[href*='/t/']".to_string(),
            blocked_url_markers: vec!["login".to_string(), "blocked".to_string()],
            save_debug_snapshots: false,
        }
    }
}

impl CrawlerConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_interval_ms)
    }

    pub fn initial_settle(&self) -> Duration {
        Duration::from_millis(self.initial_settle_ms)
    }

    pub fn element_settle(&self) -> Duration {
        Duration::from_millis(self.element_settle_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn nudge_settle(&self) -> Duration {
        Duration::from_millis(self.nudge_settle_ms)
    }

    /// Same selectors and thresholds with every pause removed.
    pub fn without_delays(self) -> Self {
        Self {
            ready_poll_interval_ms: 0,
            initial_settle_ms: 0,
            element_settle_ms: 0,
            scroll_settle_ms: 0,
            nudge_settle_ms: 0,
            ..self
        }
    }

    /// Whether a page URL indicates a login or block redirect
    pub fn is_blocked_url(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.blocked_url_markers
            .iter()
            .any(|marker| url.contains(&marker.to_lowercase()))
    }
}
