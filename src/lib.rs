//! # threadscribe
//!
//! Saves the posts and replies of a Threads profile to a PDF, Markdown,
//! plain text or JSON document.
//!
//! ## Architecture
//!
//! ```text
//! Browser → Crawler → CrawlSession → Renderer (→ fallback chain)
//! ```
//!
//! - [`browser`]: async driver interface and its Chrome implementation
//! - [`crawler`]: readiness gate, record extraction, dedup, scroll loop
//! - [`render`]: document, text, Markdown and JSON output
//!
//! ## Quick Start
//!
//! ```bash
//! # Posts and replies as PDF into ./output
//! threadscribe --username someone
//!
//! # Only replies, more scrolling, Markdown with downloaded images
//! threadscribe --username someone --skip-posts --max-scrolls 30 --output-format md
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`domain`]: Core domain models (Record, CrawlSession, FeedKind)
//! - [`fetcher`]: Image downloads over HTTP

/// Error handling.
///
/// [`ScribeError`](app::ScribeError) covers browser, HTTP, IO, JSON and
/// rendering failures.
pub mod app;

/// Remote browser access behind the [`BrowserDriver`](browser::BrowserDriver) trait.
pub mod browser;

/// Command-line interface using clap.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/threadscribe/config.toml`, with `[browser]`,
/// `[crawler]` and `[render]` sections.
pub mod config;

/// Scroll-and-extract crawling of profile feeds.
pub mod crawler;

/// Core domain models.
///
/// - [`Record`](domain::Record): one captured post or reply
/// - [`CrawlSession`](domain::CrawlSession): per-invocation collections
pub mod domain;

/// HTTP fetching of record images.
pub mod fetcher;

/// Output renderers and their fallback chain.
pub mod render;
