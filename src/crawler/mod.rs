//! Scroll-and-extract crawling of a profile's feeds.
//!
//! # Architecture
//!
//! ```text
//! navigate → ContentGate → (locate entries → RecordExtractor → dedup gate → append
//!                           → scroll → measure height)* → done
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use threadscribe::crawler::{crawl_profile, CrawlerConfig};
//! use threadscribe::domain::{CrawlSession, FeedKind};
//!
//! let mut session = CrawlSession::new("someone", 10);
//! let outcomes = crawl_profile(&driver, &config, &mut session, &FeedKind::ALL, "output").await;
//! ```

mod config;
mod dedup;
mod engine;
mod extractor;
mod images;
mod locate;
mod ready;
pub(crate) mod scripts;

pub use config::CrawlerConfig;
pub use dedup::{is_duplicate, should_save};
pub use engine::{Crawler, PassOutcome, StopReason};
pub use extractor::RecordExtractor;
pub use images::{classify, is_content_image, ImageVerdict, PROFILE_INDICATORS};
pub use ready::{ContentGate, Readiness};

use std::path::Path;

use crate::browser::BrowserDriver;
use crate::domain::{CrawlSession, FeedKind};

/// Run the requested passes in order against one session.
///
/// A pass that fails to load does not stop the ones after it.
pub async fn crawl_profile<D: BrowserDriver>(
    driver: &D,
    config: &CrawlerConfig,
    session: &mut CrawlSession,
    passes: &[FeedKind],
    diagnostics_dir: &Path,
) -> Vec<PassOutcome> {
    let crawler = Crawler::new(driver, config, diagnostics_dir);
    let mut outcomes = Vec::with_capacity(passes.len());
    for &kind in passes {
        outcomes.push(crawler.crawl(session, kind).await);
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeDriver, FakeElement};

    #[tokio::test]
    async fn test_both_passes_run_into_separate_collections() {
        let driver = FakeDriver::new()
            .with_feed(vec![FakeElement::post("same text", "2024-01-01T00:00:00Z", "u")])
            .with_heights(&[100]);
        let config = CrawlerConfig {
            ready_poll_interval_ms: 5,
            ..CrawlerConfig::default().without_delays()
        };
        let dir = tempfile::tempdir().unwrap();
        let mut session = CrawlSession::new("someone", 2);

        let outcomes =
            crawl_profile(&driver, &config, &mut session, &FeedKind::ALL, dir.path()).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.stop == StopReason::ReachedBottom));
        // Dedup is per collection, so the same entry lands in both.
        assert_eq!(session.posts().len(), 1);
        assert_eq!(session.replies().len(), 1);
        assert_eq!(
            driver.navigations(),
            vec![
                "https://www.threads.net/@someone".to_string(),
                "https://www.threads.net/@someone/replies".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_skipped_pass_is_never_started() {
        let driver = FakeDriver::new()
            .with_feed(vec![FakeElement::post("text", "", "")])
            .with_heights(&[100]);
        let config = CrawlerConfig::default().without_delays();
        let dir = tempfile::tempdir().unwrap();
        let mut session = CrawlSession::new("someone", 2);

        let outcomes =
            crawl_profile(&driver, &config, &mut session, &[FeedKind::Replies], dir.path()).await;

        assert_eq!(outcomes.len(), 1);
        assert!(session.posts().is_empty());
        assert_eq!(driver.navigations().len(), 1);
    }
}
