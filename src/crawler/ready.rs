use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::app::Result;
use crate::browser::BrowserDriver;
use crate::crawler::config::CrawlerConfig;
use crate::crawler::locate::first_match;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// A content selector matched and the page is past the size floor
    Ready { selector: String },
    /// The tab was redirected to a login or block page
    Blocked { url: String },
    TimedOut,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }
}

/// Polls a page until feed content has rendered.
pub struct ContentGate<'a, D: BrowserDriver> {
    driver: &'a D,
    config: &'a CrawlerConfig,
}

impl<'a, D: BrowserDriver> ContentGate<'a, D> {
    pub fn new(driver: &'a D, config: &'a CrawlerConfig) -> Self {
        Self { driver, config }
    }

    pub async fn wait_ready(&self, timeout: Duration) -> bool {
        self.poll(timeout).await.is_ready()
    }

    /// Poll at the configured interval until the page is ready, blocked, or
    /// `timeout` has elapsed. At least one check is always made.
    pub async fn poll(&self, timeout: Duration) -> Readiness {
        info!("Waiting for content to load...");
        let deadline = Instant::now() + timeout;

        loop {
            match self.check().await {
                Ok(Some(readiness)) => return readiness,
                Ok(None) => {}
                Err(e) => warn!("Error while waiting for content: {}", e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Readiness::TimedOut;
            }
            sleep(self.config.ready_poll_interval().min(deadline - now)).await;
        }
    }

    async fn check(&self) -> Result<Option<Readiness>> {
        let url = self.driver.current_url().await?;
        if self.config.is_blocked_url(&url) {
            return Ok(Some(Readiness::Blocked { url }));
        }

        let Some(located) = first_match(self.driver, &self.config.ready_selectors).await? else {
            return Ok(None);
        };

        let markup_len = self.driver.page_markup().await?.chars().count();
        if markup_len > self.config.min_markup_len {
            info!("Found content with selector: {}", located.selector);
            return Ok(Some(Readiness::Ready {
                selector: located.selector,
            }));
        }

        debug!(
            "Selector {} matched but page is only {} characters",
            located.selector, markup_len
        );
        Ok(None)
    }
}
