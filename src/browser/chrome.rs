use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::app::{Result, ScribeError};
use crate::browser::config::DriverConfig;
use crate::browser::BrowserDriver;

/// Chrome-backed driver using chromiumoxide.
///
/// Owns a single tab; every crawl pass navigates that same tab.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

fn cdp(context: &'static str) -> impl FnOnce(CdpError) -> ScribeError {
    move |e| ScribeError::Browser(format!("{context}: {e}"))
}

impl ChromeDriver {
    /// Launch a browser and open the tab used for crawling
    pub async fn launch(config: &DriverConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(config.window_width, config.window_height)
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--enable-javascript")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--exclude-switches=enable-automation");

        if let Some(ref ua) = config.user_agent {
            builder = builder.arg(format!("--user-agent={ua}"));
        }

        for arg in &config.extra_args {
            builder = builder.arg(arg.as_str());
        }

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(path) = config.resolve_executable() {
            tracing::info!("Using browser executable at {}", path.display());
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScribeError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            ScribeError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(cdp("Failed to create page"))?;

        if let Some(ref ua) = config.user_agent {
            page.set_user_agent(ua.as_str())
                .await
                .map_err(cdp("Failed to set user agent"))?;
        }

        tracing::info!("Browser initialized");

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(cdp("Navigation failed"))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(cdp("Navigation failed"))?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>> {
        self.page
            .find_elements(selector)
            .await
            .map_err(cdp("Element lookup failed"))
    }

    async fn find_one(&self, element: &Element, selector: &str) -> Result<Option<Element>> {
        // find_element reports "no match" as an error; a list lookup keeps
        // absence distinct from a broken session.
        let found = element
            .find_elements(selector)
            .await
            .map_err(cdp("Element lookup failed"))?;
        Ok(found.into_iter().next())
    }

    async fn find_all_in(&self, element: &Element, selector: &str) -> Result<Vec<Element>> {
        element
            .find_elements(selector)
            .await
            .map_err(cdp("Element lookup failed"))
    }

    async fn get_attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        element
            .attribute(name)
            .await
            .map_err(cdp("Attribute read failed"))
    }

    async fn get_text(&self, element: &Element) -> Result<String> {
        let text = element
            .inner_text()
            .await
            .map_err(cdp("Text read failed"))?;
        Ok(text.unwrap_or_default())
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<()> {
        element
            .scroll_into_view()
            .await
            .map_err(cdp("Scroll into view failed"))?;
        Ok(())
    }

    async fn execute(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(cdp("Script execution failed"))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn current_url(&self) -> Result<String> {
        let url = self.page.url().await.map_err(cdp("URL read failed"))?;
        Ok(url.unwrap_or_default())
    }

    async fn page_markup(&self) -> Result<String> {
        self.page.content().await.map_err(cdp("Page source read failed"))
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .map_err(cdp("Screenshot failed"))?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(cdp("Failed to close browser"))?;
        let _ = self.browser.wait().await;
        self.handler.abort();
        Ok(())
    }
}
