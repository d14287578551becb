use tracing::debug;

use crate::app::Result;
use crate::browser::BrowserDriver;
use crate::crawler::config::CrawlerConfig;
use crate::crawler::images::{classify, ImageVerdict};
use crate::domain::Record;

/// Turns one feed entry into a [`Record`].
///
/// Each field is read independently; a missing node or a failed read leaves
/// that field empty and does not affect the others.
pub struct RecordExtractor<'a> {
    config: &'a CrawlerConfig,
}

impl<'a> RecordExtractor<'a> {
    pub fn new(config: &'a CrawlerConfig) -> Self {
        Self { config }
    }

    pub async fn extract<D: BrowserDriver>(&self, driver: &D, element: &D::Element) -> Record {
        Record {
            text: or_default("text", self.text(driver, element).await),
            timestamp: or_default("timestamp", self.timestamp(driver, element).await),
            stats: or_default("stats", self.stats(driver, element).await),
            images: or_default("images", self.images(driver, element).await),
            url: or_default("url", self.url(driver, element).await),
        }
    }

    async fn text<D: BrowserDriver>(&self, driver: &D, element: &D::Element) -> Result<Option<String>> {
        match driver.find_one(element, &self.config.text_selector).await? {
            Some(node) => Ok(Some(driver.get_text(&node).await?)),
            None => Ok(None),
        }
    }

    async fn timestamp<D: BrowserDriver>(
        &self,
        driver: &D,
        element: &D::Element,
    ) -> Result<Option<String>> {
        match driver.find_one(element, &self.config.timestamp_selector).await? {
            Some(node) => driver.get_attribute(&node, "datetime").await,
            None => Ok(None),
        }
    }

    async fn stats<D: BrowserDriver>(&self, driver: &D, element: &D::Element) -> Result<Option<Vec<String>>> {
        let nodes = driver
            .find_all_in(element, &self.config.stats_selector)
            .await?;

        let mut stats = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let text = driver.get_text(node).await?;
            if !text.is_empty() {
                stats.push(text);
            }
        }
        Ok(Some(stats))
    }

    async fn images<D: BrowserDriver>(&self, driver: &D, element: &D::Element) -> Result<Option<Vec<String>>> {
        let nodes = driver
            .find_all_in(element, &self.config.image_selector)
            .await?;

        let mut urls: Vec<String> = Vec::new();
        for node in &nodes {
            let src = driver.get_attribute(node, "src").await?;
            let alt = driver.get_attribute(node, "alt").await?;
            let width = driver.get_attribute(node, "width").await?;
            let height = driver.get_attribute(node, "height").await?;

            let verdict = classify(
                src.as_deref(),
                alt.as_deref(),
                width.as_deref(),
                height.as_deref(),
            );

            match (verdict, src) {
                (ImageVerdict::Keep, Some(src)) => {
                    if !urls.contains(&src) {
                        debug!("Adding post image: {}", src);
                        urls.push(src);
                    }
                }
                (ImageVerdict::ProfileChrome, Some(src)) => debug!("Skipping profile image: {}", src),
                (ImageVerdict::TooSmall, Some(src)) => {
                    debug!(
                        "Skipping small image: {} ({}x{})",
                        src,
                        width.as_deref().unwrap_or("?"),
                        height.as_deref().unwrap_or("?")
                    )
                }
                _ => {}
            }
        }
        Ok(Some(urls))
    }

    async fn url<D: BrowserDriver>(&self, driver: &D, element: &D::Element) -> Result<Option<String>> {
        match driver.find_one(element, &self.config.link_selector).await? {
            Some(node) => driver.get_attribute(&node, "href").await,
            None => Ok(None),
        }
    }
}

fn or_default<T: Default>(field: &str, value: Result<Option<T>>) -> T {
    match value {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            debug!("Could not read {}: {}", field, e);
            T::default()
        }
    }
}
