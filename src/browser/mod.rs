//! Remote browser access.
//!
//! The crawler only talks to the page through [`BrowserDriver`], a narrow
//! async interface over a live browser tab. [`ChromeDriver`] implements it on
//! top of chromiumoxide.
//!
//! ```rust,ignore
//! use threadscribe::browser::{BrowserDriver, ChromeDriver, DriverConfig};
//!
//! let mut driver = ChromeDriver::launch(&DriverConfig::default()).await?;
//! driver.navigate("https://www.threads.net/@someone").await?;
//! let articles = driver.find_all("article").await?;
//! driver.quit().await?;
//! ```

mod chrome;
pub mod config;
#[cfg(test)]
pub(crate) mod fake;

pub use chrome::ChromeDriver;
pub use config::DriverConfig;

use std::path::Path;

use async_trait::async_trait;

use crate::app::Result;

/// Operations the crawler needs from a browser tab.
///
/// Lookups that find nothing return empty collections or `None`; an `Err`
/// means the browser itself failed to answer.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Opaque handle to one node of the rendered document
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<()>;

    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    async fn find_one(&self, element: &Self::Element, selector: &str)
        -> Result<Option<Self::Element>>;

    async fn find_all_in(&self, element: &Self::Element, selector: &str)
        -> Result<Vec<Self::Element>>;

    async fn get_attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn get_text(&self, element: &Self::Element) -> Result<String>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()>;

    /// Evaluate a script in the page and return its JSON value
    /// (`Null` for scripts that produce nothing).
    async fn execute(&self, script: &str) -> Result<serde_json::Value>;

    async fn current_url(&self) -> Result<String>;

    async fn page_markup(&self) -> Result<String>;

    async fn screenshot(&self, path: &Path) -> Result<()>;

    async fn quit(&mut self) -> Result<()>;
}
