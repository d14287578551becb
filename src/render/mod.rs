//! Output renderers and the fallback chain between them.
//!
//! Each output format is an ordered list of [`RenderStep`]s. The first step
//! that succeeds wins; a failing step is logged and the next one is tried.
//!
//! ```text
//! pdf  → text-only pdf → txt → json
//! md   → txt → json
//! txt  → json
//! json
//! ```

pub mod config;
pub mod document;
pub mod json;
pub mod markdown;
pub mod pdf;
pub mod text;

pub use config::RenderConfig;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use tracing::{info, warn};

use crate::app::{Result, ScribeError};
use crate::domain::{CrawlSession, FeedKind};
use crate::fetcher::{image_headers, ImageFetcher};

/// Formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Pdf,
    Json,
    Txt,
    Md,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Json => "json",
            OutputFormat::Txt => "txt",
            OutputFormat::Md => "md",
        }
    }
}

/// One concrete way of writing the session to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStep {
    RichDocument,
    TextOnlyDocument,
    PlainText,
    Markdown,
    StructuredDump,
}

impl RenderStep {
    /// Steps attempted for `format`, in order.
    pub fn chain(format: OutputFormat) -> &'static [RenderStep] {
        use RenderStep::*;
        match format {
            OutputFormat::Pdf => &[RichDocument, TextOnlyDocument, PlainText, StructuredDump],
            OutputFormat::Md => &[Markdown, PlainText, StructuredDump],
            OutputFormat::Txt => &[PlainText, StructuredDump],
            OutputFormat::Json => &[StructuredDump],
        }
    }

    /// Where this step writes, given the requested output path.
    pub fn output_path(self, requested: &Path) -> PathBuf {
        match self {
            RenderStep::RichDocument => requested.with_extension("pdf"),
            RenderStep::TextOnlyDocument => {
                let stem = requested
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                requested.with_file_name(format!("{}_text_only.pdf", stem))
            }
            RenderStep::PlainText => requested.with_extension("txt"),
            RenderStep::Markdown => requested.with_extension("md"),
            RenderStep::StructuredDump => requested.with_extension("json"),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            RenderStep::RichDocument => "PDF",
            RenderStep::TextOnlyDocument => "text-only PDF",
            RenderStep::PlainText => "text file",
            RenderStep::Markdown => "Markdown",
            RenderStep::StructuredDump => "JSON",
        }
    }
}

/// Writes a finished session in the requested format.
pub struct Renderer<'a> {
    session: &'a CrawlSession,
    config: &'a RenderConfig,
    fetcher: &'a dyn ImageFetcher,
    generated_at: String,
}

impl<'a> Renderer<'a> {
    pub fn new(
        session: &'a CrawlSession,
        config: &'a RenderConfig,
        fetcher: &'a dyn ImageFetcher,
        generated_at: impl Into<String>,
    ) -> Self {
        Self {
            session,
            config,
            fetcher,
            generated_at: generated_at.into(),
        }
    }

    /// Render `format` at `path`, walking the fallback chain on failure.
    /// Returns the path that was actually written.
    pub async fn render(&self, format: OutputFormat, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut last_error = ScribeError::Render("no render steps".to_string());
        for &step in RenderStep::chain(format) {
            let target = step.output_path(path);
            match self.run_step(step, &target).await {
                Ok(()) => {
                    info!("{} saved to {}", step.describe(), target.display());
                    return Ok(target);
                }
                Err(e) => {
                    warn!("Error creating {}: {}", step.describe(), e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn run_step(&self, step: RenderStep, target: &Path) -> Result<()> {
        match step {
            RenderStep::RichDocument => {
                pdf::write(self.session, target, &self.generated_at, self.config, Some(self.fetcher))
                    .await
            }
            RenderStep::TextOnlyDocument => {
                pdf::write(self.session, target, &self.generated_at, self.config, None).await
            }
            RenderStep::PlainText => text::write(self.session, target, &self.generated_at),
            RenderStep::Markdown => {
                markdown::write(self.session, target, &self.generated_at, self.config, self.fetcher)
                    .await
            }
            RenderStep::StructuredDump => json::write(self.session, target),
        }
    }
}

pub fn document_title(target: &str) -> String {
    format!("Threads Posts and Replies for @{}", target)
}

/// `"Post #3 - 2024-01-01 12:30:00 UTC"`, or just `"Post #3"` without a timestamp.
pub fn record_heading(kind: FeedKind, index: usize, timestamp: &str) -> String {
    if timestamp.is_empty() {
        format!("{} #{}", kind.item_label(), index)
    } else {
        format!("{} #{} - {}", kind.item_label(), index, format_timestamp(timestamp))
    }
}

/// RFC 3339 timestamps are normalised to UTC; anything else is returned as is.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt
            .with_timezone(&chrono::Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Replace characters the document fonts cannot lay out.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2028}' | '\u{2029}' => ' ',
            '\n' | '\r' | '\t' => c,
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

/// Fetch one image body. Failures are logged and yield `None`.
pub(crate) async fn download_image(
    fetcher: &dyn ImageFetcher,
    url: &str,
    config: &RenderConfig,
) -> Option<Vec<u8>> {
    let headers = image_headers(&config.user_agent, &config.referer);
    match fetcher.get(url, &headers, config.image_timeout()).await {
        Ok(response) if response.is_ok() => Some(response.body),
        Ok(response) => {
            warn!("Failed to download image {}: HTTP {}", url, response.status);
            None
        }
        Err(e) => {
            warn!("Error downloading image {}: {}", url, e);
            None
        }
    }
}
