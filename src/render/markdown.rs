use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::app::Result;
use crate::domain::{CrawlSession, FeedKind, Record};
use crate::fetcher::ImageFetcher;
use crate::render::config::RenderConfig;
use crate::render::{document_title, download_image, record_heading};

pub const IMAGES_DIR: &str = "images";

/// Write a Markdown document and download record images into an `images/`
/// directory next to it. Images that cannot be fetched are linked by URL.
pub async fn write(
    session: &CrawlSession,
    path: &Path,
    generated_at: &str,
    config: &RenderConfig,
    fetcher: &dyn ImageFetcher,
) -> Result<()> {
    let output_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let images_dir = output_dir.join(IMAGES_DIR);
    fs::create_dir_all(&images_dir)?;

    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", document_title(session.target()));
    let _ = writeln!(out, "*Generated on {}*\n", generated_at);

    for kind in FeedKind::ALL {
        let records = session.records(kind);
        if records.is_empty() {
            continue;
        }

        let label = kind.label();
        let mut section = label[..1].to_uppercase();
        section.push_str(&label[1..]);
        let _ = writeln!(out, "## {}\n", section);

        for (i, record) in records.iter().enumerate() {
            write_record(&mut out, kind, i + 1, record, &images_dir, config, fetcher).await;
        }
    }

    fs::write(path, out)?;
    Ok(())
}

async fn write_record(
    out: &mut String,
    kind: FeedKind,
    index: usize,
    record: &Record,
    images_dir: &Path,
    config: &RenderConfig,
    fetcher: &dyn ImageFetcher,
) {
    let _ = writeln!(out, "### {}\n", record_heading(kind, index, &record.timestamp));

    if !record.text.is_empty() {
        let _ = writeln!(out, "{}\n", record.text);
    }
    if !record.stats.is_empty() {
        let _ = writeln!(out, "*{}*\n", record.stats.join(" | "));
    }
    if !record.url.is_empty() {
        let _ = writeln!(out, "[View post]({})\n", record.url);
    }

    for (i, url) in record.images.iter().enumerate() {
        let link = if i < config.max_images_per_record {
            match save_image(url, images_dir, config, fetcher).await {
                Some(relative) => relative,
                None => url.clone(),
            }
        } else {
            url.clone()
        };
        let _ = writeln!(out, "![Thread Image]({})\n", link);
    }

    out.push_str("---\n\n");
}

async fn save_image(
    url: &str,
    images_dir: &Path,
    config: &RenderConfig,
    fetcher: &dyn ImageFetcher,
) -> Option<String> {
    let body = download_image(fetcher, url, config).await?;
    let file_name = image_file_name(url);
    match fs::write(images_dir.join(&file_name), body) {
        Ok(()) => Some(format!("{}/{}", IMAGES_DIR, file_name)),
        Err(e) => {
            warn!("Error saving image {}: {}", url, e);
            None
        }
    }
}

/// Stable file name for a downloaded image: a URL hash plus the URL's
/// extension (`jpg` when it has none).
pub fn image_file_name(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    let extension = url::Url::parse(url)
        .ok()
        .and_then(|u| {
            Path::new(u.path())
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
        })
        .filter(|e| (1..=5).contains(&e.len()) && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string());
    format!("{}.{}", &digest[..16], extension)
}
