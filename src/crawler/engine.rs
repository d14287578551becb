use std::path::PathBuf;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::app::{Result, ScribeError};
use crate::browser::BrowserDriver;
use crate::crawler::config::CrawlerConfig;
use crate::crawler::dedup::should_save;
use crate::crawler::extractor::RecordExtractor;
use crate::crawler::locate::first_match;
use crate::crawler::ready::{ContentGate, Readiness};
use crate::crawler::scripts;
use crate::domain::{CrawlSession, FeedKind, Record};

/// Why a pass stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Content never rendered, or the page redirected to a wall
    NotReady(Readiness),
    /// Height stayed flat across a scroll and a nudge
    ReachedBottom,
    /// `2 × scroll_budget` scroll attempts were used up
    AttemptCap,
    /// The browser stopped answering mid-pass
    DriverFailure(String),
}

/// Summary of one pass over a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    pub kind: FeedKind,
    /// Records appended to the session during this pass
    pub collected: usize,
    /// Completed scroll attempts
    pub attempts: usize,
    /// Scroll-to-bottom and nudge scripts issued
    pub scroll_actions: usize,
    pub stop: StopReason,
}

enum PassState {
    Init,
    Loading,
    Extracting,
    Scrolling,
    Done(StopReason),
}

struct PassProgress {
    collected: usize,
    attempts: usize,
    scroll_actions: usize,
    last_height: i64,
    max_attempts: usize,
}

/// Drives one feed from navigation to exhaustion.
///
/// ```text
/// INIT → LOADING → EXTRACTING ⇄ SCROLLING → DONE
/// ```
///
/// Everything runs sequentially on the caller's task; each wait is a fixed
/// pause from [`CrawlerConfig`].
pub struct Crawler<'a, D: BrowserDriver> {
    driver: &'a D,
    config: &'a CrawlerConfig,
    extractor: RecordExtractor<'a>,
    diagnostics_dir: PathBuf,
}

impl<'a, D: BrowserDriver> Crawler<'a, D> {
    pub fn new(driver: &'a D, config: &'a CrawlerConfig, diagnostics_dir: impl Into<PathBuf>) -> Self {
        Self {
            driver,
            config,
            extractor: RecordExtractor::new(config),
            diagnostics_dir: diagnostics_dir.into(),
        }
    }

    /// Run one pass over `kind`, appending accepted records to `session`.
    pub async fn crawl(&self, session: &mut CrawlSession, kind: FeedKind) -> PassOutcome {
        let url = kind.url(&self.config.base_url, session.target());
        info!("Scraping {} from {}...", kind, url);

        let mut progress = PassProgress {
            collected: 0,
            attempts: 0,
            scroll_actions: 0,
            last_height: 0,
            max_attempts: session.scroll_budget().saturating_mul(2),
        };

        let mut state = PassState::Init;
        let stop = loop {
            state = match state {
                PassState::Init => match self.init(&url).await {
                    Ok(()) => PassState::Loading,
                    Err(e) => PassState::Done(StopReason::DriverFailure(e.to_string())),
                },
                PassState::Loading => self.load(kind, &mut progress).await,
                PassState::Extracting => {
                    self.extract_visible(session, kind, &mut progress).await;
                    PassState::Scrolling
                }
                PassState::Scrolling => match self.scroll(&mut progress).await {
                    Ok(next) => next,
                    Err(e) => PassState::Done(StopReason::DriverFailure(e.to_string())),
                },
                PassState::Done(reason) => break reason,
            };
        };

        if let StopReason::DriverFailure(ref e) = stop {
            warn!("Browser error during {} pass: {}", kind, e);
        }

        info!("Extracted {} {}", progress.collected, kind);
        if progress.collected == 0 {
            self.report_empty(kind).await;
        }

        PassOutcome {
            kind,
            collected: progress.collected,
            attempts: progress.attempts,
            scroll_actions: progress.scroll_actions,
            stop,
        }
    }

    async fn init(&self, url: &str) -> Result<()> {
        self.driver.navigate(url).await?;
        sleep(self.config.initial_settle()).await;
        if let Err(e) = self.driver.execute(scripts::INITIAL_LOAD).await {
            debug!("Initial load script failed: {}", e);
        }
        Ok(())
    }

    async fn load(&self, kind: FeedKind, progress: &mut PassProgress) -> PassState {
        let gate = ContentGate::new(self.driver, self.config);
        let readiness = gate.poll(self.config.ready_timeout()).await;
        if !readiness.is_ready() {
            warn!(
                "Failed to load {}. The page might be protected or require authentication. ({:?})",
                kind, readiness
            );
            return PassState::Done(StopReason::NotReady(readiness));
        }

        info!("Loading {} page...", kind);
        if self.config.save_debug_snapshots {
            self.save_debug_snapshot(kind).await;
        }

        progress.last_height = match self.page_height().await {
            Ok(height) => height,
            Err(e) => return PassState::Done(StopReason::DriverFailure(e.to_string())),
        };

        if progress.max_attempts == 0 {
            PassState::Done(StopReason::AttemptCap)
        } else {
            PassState::Extracting
        }
    }

    async fn extract_visible(&self, session: &mut CrawlSession, kind: FeedKind, progress: &mut PassProgress) {
        let located = match first_match(self.driver, &self.config.feed_selectors).await {
            Ok(Some(located)) => located,
            Ok(None) => {
                debug!("No feed entries visible");
                return;
            }
            Err(e) => {
                warn!("Failed to locate feed entries: {}", e);
                return;
            }
        };

        info!(
            "Found {} items with selector: {}",
            located.elements.len(),
            located.selector
        );

        for element in &located.elements {
            let record = match self.extract_element(element).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("Error extracting {}: {}", kind.item_label().to_lowercase(), e);
                    continue;
                }
            };

            if should_save(&record, session.records(kind)) {
                progress.collected += 1;
                info!(
                    "Extracted {} #{}: {}...",
                    kind.item_label().to_lowercase(),
                    progress.collected,
                    record.preview(100)
                );
                session.append(kind, record);
            }
        }
    }

    async fn extract_element(&self, element: &D::Element) -> Result<Record> {
        self.driver.scroll_into_view(element).await?;
        sleep(self.config.element_settle()).await;
        Ok(self.extractor.extract(self.driver, element).await)
    }

    async fn scroll(&self, progress: &mut PassProgress) -> Result<PassState> {
        info!(
            "Scrolling... (attempt {}/{})",
            progress.attempts + 1,
            progress.max_attempts
        );

        self.driver.execute(scripts::SCROLL_TO_BOTTOM).await?;
        progress.scroll_actions += 1;
        sleep(self.config.scroll_settle()).await;

        let mut height = self.page_height().await?;
        if height == progress.last_height {
            self.driver.execute(scripts::NUDGE).await?;
            progress.scroll_actions += 1;
            sleep(self.config.nudge_settle()).await;

            height = self.page_height().await?;
            if height == progress.last_height {
                info!("Reached the bottom of the page");
                return Ok(PassState::Done(StopReason::ReachedBottom));
            }
        }

        progress.last_height = height;
        progress.attempts += 1;

        if progress.attempts >= progress.max_attempts {
            info!("Scroll limit of {} attempts reached", progress.max_attempts);
            Ok(PassState::Done(StopReason::AttemptCap))
        } else {
            Ok(PassState::Extracting)
        }
    }

    async fn page_height(&self) -> Result<i64> {
        let value = self.driver.execute(scripts::PAGE_HEIGHT).await?;
        value
            .as_f64()
            .map(|h| h as i64)
            .ok_or_else(|| ScribeError::Browser(format!("Unexpected page height value: {}", value)))
    }

    async fn save_debug_snapshot(&self, kind: FeedKind) {
        if let Err(e) = std::fs::create_dir_all(&self.diagnostics_dir) {
            warn!("Cannot create {}: {}", self.diagnostics_dir.display(), e);
            return;
        }

        let screenshot = self.diagnostic_path(&format!("debug_{}_page.png", kind));
        match self.driver.screenshot(&screenshot).await {
            Ok(()) => info!("Saved debug screenshot to {}", screenshot.display()),
            Err(e) => warn!("Failed to save debug screenshot: {}", e),
        }

        let source = self.diagnostic_path(&format!("debug_{}_page.html", kind));
        let written = match self.driver.page_markup().await {
            Ok(markup) => std::fs::write(&source, markup).map_err(ScribeError::from),
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => info!("Saved page source to {}", source.display()),
            Err(e) => warn!("Failed to save page source: {}", e),
        }
    }

    async fn report_empty(&self, kind: FeedKind) {
        warn!("No {} were extracted. This might indicate:", kind);
        warn!("1. The account might be private");
        warn!("2. The content might require authentication");
        warn!("3. The page structure might have changed");
        warn!("4. There might be anti-scraping measures in place");

        if let Err(e) = std::fs::create_dir_all(&self.diagnostics_dir) {
            warn!("Cannot create {}: {}", self.diagnostics_dir.display(), e);
            return;
        }
        let path = self.diagnostic_path(&format!("final_{}_page.png", kind));
        match self.driver.screenshot(&path).await {
            Ok(()) => info!("Saved final state screenshot to {}", path.display()),
            Err(e) => debug!("Final screenshot failed: {}", e),
        }
    }

    fn diagnostic_path(&self, name: &str) -> PathBuf {
        self.diagnostics_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeDriver, FakeElement};

    fn config() -> CrawlerConfig {
        CrawlerConfig {
            ready_poll_interval_ms: 5,
            ready_timeout_secs: 1,
            ..CrawlerConfig::default().without_delays()
        }
    }

    fn post(text: &str, n: u32) -> FakeElement {
        FakeElement::post(
            text,
            &format!("2024-01-0{n}T00:00:00Z"),
            &format!("https://www.threads.net/t/{n}"),
        )
    }

    async fn run(driver: &FakeDriver, budget: usize, kind: FeedKind) -> (CrawlSession, PassOutcome) {
        let config = config();
        let dir = tempfile::tempdir().unwrap();
        let crawler = Crawler::new(driver, &config, dir.path());
        let mut session = CrawlSession::new("someone", budget);
        let outcome = crawler.crawl(&mut session, kind).await;
        (session, outcome)
    }

    #[tokio::test]
    async fn test_flat_height_stops_after_scroll_and_nudge() {
        let driver = FakeDriver::new()
            .with_feed(vec![post("hello", 1)])
            .with_heights(&[100, 100, 100]);

        let (session, outcome) = run(&driver, 10, FeedKind::Posts).await;

        assert_eq!(outcome.stop, StopReason::ReachedBottom);
        assert_eq!(outcome.scroll_actions, 2);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(driver.count_script(scripts::SCROLL_TO_BOTTOM), 1);
        assert_eq!(driver.count_script(scripts::NUDGE), 1);
        assert_eq!(session.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_attempts_capped_at_twice_the_budget() {
        let driver = FakeDriver::new()
            .with_feed(vec![post("hello", 1)])
            .growing_forever();

        let (_, outcome) = run(&driver, 5, FeedKind::Posts).await;

        assert_eq!(outcome.stop, StopReason::AttemptCap);
        assert_eq!(outcome.attempts, 10);
        assert_eq!(driver.count_script(scripts::SCROLL_TO_BOTTOM), 10);
        assert_eq!(driver.count_script(scripts::NUDGE), 0);
    }

    #[tokio::test]
    async fn test_identical_entries_keep_first_url() {
        let same = |url: &str| FakeElement::post("hi", "2024-01-01T00:00:00Z", url);
        let driver = FakeDriver::new()
            .with_feed(vec![
                same("https://www.threads.net/t/a"),
                same("https://www.threads.net/t/b"),
                same("https://www.threads.net/t/c"),
            ])
            .with_heights(&[100, 100, 100]);

        let (session, outcome) = run(&driver, 10, FeedKind::Posts).await;

        assert_eq!(outcome.collected, 1);
        assert_eq!(session.posts().len(), 1);
        assert_eq!(session.posts()[0].url, "https://www.threads.net/t/a");
    }

    #[tokio::test]
    async fn test_revealed_entries_append_in_encounter_order() {
        let driver = FakeDriver::new()
            .with_feed(vec![post("one", 1), post("two", 2)])
            .with_reveal(vec![post("three", 3), post("two", 2)])
            .with_heights(&[100, 200, 200, 200]);

        let (session, outcome) = run(&driver, 10, FeedKind::Posts).await;

        let texts: Vec<&str> = session.posts().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
        assert_eq!(outcome.collected, 3);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.stop, StopReason::ReachedBottom);
    }

    #[tokio::test]
    async fn test_nudge_that_grows_page_continues() {
        let driver = FakeDriver::new()
            .with_feed(vec![post("one", 1)])
            .with_heights(&[100, 100, 180, 180, 180]);

        let (_, outcome) = run(&driver, 10, FeedKind::Posts).await;

        assert_eq!(outcome.attempts, 1);
        assert_eq!(driver.count_script(scripts::SCROLL_TO_BOTTOM), 2);
        assert_eq!(driver.count_script(scripts::NUDGE), 2);
        assert_eq!(outcome.stop, StopReason::ReachedBottom);
    }

    #[tokio::test]
    async fn test_failed_element_is_skipped() {
        let driver = FakeDriver::new()
            .with_feed(vec![post("one", 1), post("bad", 2).broken(), post("three", 3)])
            .with_heights(&[100, 100, 100]);

        let (session, _) = run(&driver, 10, FeedKind::Posts).await;

        let texts: Vec<&str> = session.posts().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["one", "three"]);
    }

    #[tokio::test]
    async fn test_empty_entries_are_discarded() {
        let driver = FakeDriver::new()
            .with_feed(vec![
                FakeElement::new().child("time", FakeElement::new().attr("datetime", "2024-01-01")),
                post("kept", 1),
            ])
            .with_heights(&[100, 100, 100]);

        let (session, outcome) = run(&driver, 10, FeedKind::Posts).await;

        assert_eq!(outcome.collected, 1);
        assert_eq!(session.posts()[0].text, "kept");
    }

    #[tokio::test]
    async fn test_blocked_page_ends_pass_with_diagnostics() {
        let driver = FakeDriver::new()
            .with_url("https://www.threads.net/login")
            .with_feed(vec![post("hidden", 1)]);

        let (session, outcome) = run(&driver, 10, FeedKind::Posts).await;

        assert!(matches!(outcome.stop, StopReason::NotReady(Readiness::Blocked { .. })));
        assert_eq!(outcome.collected, 0);
        assert!(session.is_empty());
        assert_eq!(driver.count_script(scripts::SCROLL_TO_BOTTOM), 0);

        let shots = driver.screenshots();
        assert_eq!(shots.len(), 1);
        assert!(shots[0].ends_with("final_posts_page.png"));
    }

    #[tokio::test]
    async fn test_unwritable_diagnostics_dir_skips_final_screenshot() {
        let driver = FakeDriver::new().with_url("https://www.threads.net/login");
        let config = config();
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let mut session = CrawlSession::new("someone", 10);

        let outcome = Crawler::new(&driver, &config, blocker.join("diagnostics"))
            .crawl(&mut session, FeedKind::Posts)
            .await;

        assert_eq!(outcome.collected, 0);
        assert!(driver.screenshots().is_empty());
    }

    #[tokio::test]
    async fn test_replies_pass_fills_replies() {
        let driver = FakeDriver::new()
            .with_feed(vec![post("a reply", 1)])
            .with_heights(&[100, 100, 100]);

        let (session, outcome) = run(&driver, 3, FeedKind::Replies).await;

        assert_eq!(outcome.kind, FeedKind::Replies);
        assert_eq!(
            driver.navigations(),
            vec!["https://www.threads.net/@someone/replies".to_string()]
        );
        assert!(session.posts().is_empty());
        assert_eq!(session.replies()[0].text, "a reply");
    }

    #[tokio::test]
    async fn test_zero_budget_extracts_nothing() {
        let driver = FakeDriver::new().with_feed(vec![post("one", 1)]);

        let (session, outcome) = run(&driver, 0, FeedKind::Posts).await;

        assert_eq!(outcome.stop, StopReason::AttemptCap);
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_debug_snapshot_written_when_enabled() {
        let driver = FakeDriver::new()
            .with_feed(vec![post("one", 1)])
            .with_heights(&[100, 100, 100]);
        let config = CrawlerConfig {
            save_debug_snapshots: true,
            ..config()
        };
        let dir = tempfile::tempdir().unwrap();
        let crawler = Crawler::new(&driver, &config, dir.path());
        let mut session = CrawlSession::new("someone", 2);

        crawler.crawl(&mut session, FeedKind::Posts).await;

        assert!(dir.path().join("debug_posts_page.html").exists());
        assert!(driver.screenshots()[0].ends_with("debug_posts_page.png"));
    }
}
