use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::app::Result;
use crate::domain::{CrawlSession, FeedKind};
use crate::render::{document_title, record_heading};

pub fn to_text(session: &CrawlSession, generated_at: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", document_title(session.target()));
    let _ = writeln!(out, "Generated on {}\n", generated_at);

    for kind in FeedKind::ALL {
        let records = session.records(kind);
        if records.is_empty() {
            continue;
        }

        let _ = writeln!(out, "=== {} ===\n", kind.label().to_uppercase());
        for (i, record) in records.iter().enumerate() {
            let _ = writeln!(out, "{}\n", record_heading(kind, i + 1, &record.timestamp));

            if !record.text.is_empty() {
                let _ = writeln!(out, "{}\n", record.text);
            }
            if !record.stats.is_empty() {
                let _ = writeln!(out, "{}\n", record.stats.join(" | "));
            }
            if !record.url.is_empty() {
                let _ = writeln!(out, "URL: {}\n", record.url);
            }
            if !record.images.is_empty() {
                let _ = writeln!(out, "Images: {}", record.images.len());
                for url in &record.images {
                    let _ = writeln!(out, "  {}", url);
                }
                out.push('\n');
            }
            out.push_str("---\n\n");
        }
    }

    out
}

pub fn write(session: &CrawlSession, path: &Path, generated_at: &str) -> Result<()> {
    fs::write(path, to_text(session, generated_at))?;
    Ok(())
}
