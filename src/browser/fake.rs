//! Scripted in-memory driver for exercising the crawler without a browser.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{Result, ScribeError};
use crate::browser::BrowserDriver;
use crate::crawler::scripts;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub text: String,
    pub attrs: HashMap<String, String>,
    pub children: Vec<(String, FakeElement)>,
    /// Scrolling this element into view fails
    pub broken: bool,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, selector: &str, child: FakeElement) -> Self {
        self.children.push((selector.to_string(), child));
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    /// A feed article shaped like the default field selectors expect.
    pub fn post(text: &str, timestamp: &str, url: &str) -> Self {
        Self::new()
            .child("span[dir='auto']", FakeElement::new().text(text))
            .child("time", FakeElement::new().attr("datetime", timestamp))
            .child("a[href*='/t/']", FakeElement::new().attr("href", url))
    }

    pub fn image(src: &str, alt: &str) -> Self {
        Self::new().attr("src", src).attr("alt", alt)
    }
}

#[derive(Debug, Default)]
struct PageState {
    elements: HashMap<String, Vec<FakeElement>>,
    feed_selector: String,
    /// Batches appended to the feed on each scroll to the bottom
    reveals: VecDeque<Vec<FakeElement>>,
    heights: VecDeque<i64>,
    height: i64,
    grow_forever: bool,
    url: String,
    markup: String,
    /// URLs reported by successive `current_url` calls; the last one sticks
    url_script: VecDeque<String>,
    /// Markup returned by successive `page_markup` calls; the last one sticks
    markup_script: VecDeque<String>,
    url_reads: usize,
    scripts: Vec<String>,
    navigations: Vec<String>,
    screenshots: Vec<PathBuf>,
    quit: bool,
}

#[derive(Debug, Default)]
pub struct FakeDriver {
    state: Mutex<PageState>,
}

impl FakeDriver {
    pub fn new() -> Self {
        let driver = Self::default();
        {
            let mut state = driver.lock();
            state.url = "https://www.threads.net/@someone".to_string();
            state.markup = "x".repeat(5000);
            state.feed_selector = "article".to_string();
            state.height = 1000;
        }
        driver
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_elements(self, selector: &str, elements: Vec<FakeElement>) -> Self {
        self.lock()
            .elements
            .insert(selector.to_string(), elements);
        self
    }

    pub fn with_feed(self, articles: Vec<FakeElement>) -> Self {
        let selector = self.lock().feed_selector.clone();
        self.with_elements(&selector, articles)
    }

    pub fn with_reveal(self, batch: Vec<FakeElement>) -> Self {
        self.lock().reveals.push_back(batch);
        self
    }

    /// Heights returned by successive measurements; the last one repeats.
    pub fn with_heights(self, heights: &[i64]) -> Self {
        {
            let mut state = self.lock();
            state.heights = heights.iter().copied().collect();
        }
        self
    }

    pub fn growing_forever(self) -> Self {
        self.lock().grow_forever = true;
        self
    }

    pub fn with_url(self, url: &str) -> Self {
        self.lock().url = url.to_string();
        self
    }

    pub fn with_markup_len(self, len: usize) -> Self {
        self.lock().markup = "x".repeat(len);
        self
    }

    pub fn with_markup(self, markup: &str) -> Self {
        self.lock().markup = markup.to_string();
        self
    }

    /// URLs for successive `current_url` calls, e.g. a late login redirect.
    pub fn with_url_sequence(self, urls: &[&str]) -> Self {
        self.lock().url_script = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    /// Markup sizes for successive `page_markup` calls.
    pub fn with_markup_sequence(self, lens: &[usize]) -> Self {
        self.lock().markup_script = lens.iter().map(|n| "x".repeat(*n)).collect();
        self
    }

    /// Number of `current_url` calls so far.
    pub fn url_reads(&self) -> usize {
        self.lock().url_reads
    }

    pub fn count_script(&self, script: &str) -> usize {
        self.lock().scripts.iter().filter(|s| *s == script).count()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.lock().screenshots.clone()
    }

    pub fn has_quit(&self) -> bool {
        self.lock().quit
    }

    fn matches<'a>(element: &'a FakeElement, selector: &str) -> Vec<&'a FakeElement> {
        element
            .children
            .iter()
            .filter(|(s, _)| s == selector)
            .map(|(_, child)| child)
            .collect()
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.lock();
        state.navigations.push(url.to_string());
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>> {
        Ok(self
            .lock()
            .elements
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_one(&self, element: &FakeElement, selector: &str) -> Result<Option<FakeElement>> {
        Ok(Self::matches(element, selector).first().map(|e| (*e).clone()))
    }

    async fn find_all_in(&self, element: &FakeElement, selector: &str) -> Result<Vec<FakeElement>> {
        Ok(Self::matches(element, selector).into_iter().cloned().collect())
    }

    async fn get_attribute(&self, element: &FakeElement, name: &str) -> Result<Option<String>> {
        Ok(element.attrs.get(name).cloned())
    }

    async fn get_text(&self, element: &FakeElement) -> Result<String> {
        Ok(element.text.clone())
    }

    async fn scroll_into_view(&self, element: &FakeElement) -> Result<()> {
        if element.broken {
            return Err(ScribeError::Browser("node is detached".into()));
        }
        Ok(())
    }

    async fn execute(&self, script: &str) -> Result<serde_json::Value> {
        let mut state = self.lock();
        state.scripts.push(script.to_string());

        if script == scripts::PAGE_HEIGHT {
            if let Some(next) = state.heights.pop_front() {
                state.height = next;
            } else if state.grow_forever {
                state.height += 500;
            }
            return Ok(serde_json::json!(state.height));
        }

        if script == scripts::SCROLL_TO_BOTTOM {
            if let Some(batch) = state.reveals.pop_front() {
                let selector = state.feed_selector.clone();
                state.elements.entry(selector).or_default().extend(batch);
            }
        }

        Ok(serde_json::Value::Null)
    }

    async fn current_url(&self) -> Result<String> {
        let mut state = self.lock();
        state.url_reads += 1;
        if let Some(url) = state.url_script.pop_front() {
            state.url = url;
        }
        Ok(state.url.clone())
    }

    async fn page_markup(&self) -> Result<String> {
        let mut state = self.lock();
        if let Some(markup) = state.markup_script.pop_front() {
            state.markup = markup;
        }
        Ok(state.markup.clone())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.lock().screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        self.lock().quit = true;
        Ok(())
    }
}
