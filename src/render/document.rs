//! Layout of the paged document, independent of the PDF backend.

use crate::domain::{CrawlSession, FeedKind, Record};
use crate::render::config::RenderConfig;
use crate::render::{clean_text, document_title, record_heading};

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Subtitle(String),
    Heading(String),
    Caption(String),
    Body(String),
    Link(String),
    Image(String),
    Spacer,
    PageBreak,
}

/// Lay the session out as a flat list of blocks.
///
/// Sections are separated by a page break, and a page break follows every
/// `records_per_page` records inside a section. At most
/// `max_images_per_record` images are placed per record.
pub fn build(session: &CrawlSession, generated_at: &str, config: &RenderConfig) -> Vec<Block> {
    let mut blocks = vec![
        Block::Title(document_title(session.target())),
        Block::Caption(format!("Generated on {}", generated_at)),
        Block::Spacer,
    ];

    let mut sections = FeedKind::ALL
        .into_iter()
        .filter(|kind| !session.records(*kind).is_empty())
        .peekable();

    while let Some(kind) = sections.next() {
        let label = kind.label();
        blocks.push(Block::Subtitle(format!(
            "{}{}",
            label[..1].to_uppercase(),
            &label[1..]
        )));

        let records = session.records(kind);
        for (i, record) in records.iter().enumerate() {
            push_record(&mut blocks, kind, i + 1, record, config);

            let per_page = config.records_per_page.max(1);
            if (i + 1) % per_page == 0 && i + 1 < records.len() {
                blocks.push(Block::PageBreak);
            }
        }

        if sections.peek().is_some() {
            blocks.push(Block::PageBreak);
        }
    }

    blocks
}

fn push_record(
    blocks: &mut Vec<Block>,
    kind: FeedKind,
    index: usize,
    record: &Record,
    config: &RenderConfig,
) {
    blocks.push(Block::Heading(record_heading(kind, index, &record.timestamp)));
    if !record.text.is_empty() {
        blocks.push(Block::Body(clean_text(&record.text)));
    }
    if !record.stats.is_empty() {
        blocks.push(Block::Caption(clean_text(&record.stats.join(" | "))));
    }
    if !record.url.is_empty() {
        blocks.push(Block::Link(format!("URL: {}", record.url)));
    }
    for url in record.images.iter().take(config.max_images_per_record) {
        blocks.push(Block::Image(url.clone()));
    }
    blocks.push(Block::Spacer);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str) -> Record {
        Record {
            text: text.into(),
            ..Default::default()
        }
    }

    fn page_breaks(blocks: &[Block]) -> usize {
        blocks.iter().filter(|b| **b == Block::PageBreak).count()
    }

    #[test]
    fn test_page_break_after_every_n_records() {
        let mut session = CrawlSession::new("someone", 1);
        for i in 0..7 {
            session.append(FeedKind::Posts, record(&format!("post {i}")));
        }

        let blocks = build(&session, "now", &RenderConfig::default());

        // after records 3 and 6; none trailing
        assert_eq!(page_breaks(&blocks), 2);
        assert_eq!(blocks[0], Block::Title("Threads Posts and Replies for @someone".into()));
        assert_eq!(blocks[3], Block::Subtitle("Posts".into()));
    }

    #[test]
    fn test_sections_separated_by_page_break() {
        let mut session = CrawlSession::new("someone", 1);
        session.append(FeedKind::Posts, record("p"));
        session.append(FeedKind::Replies, record("r"));

        let blocks = build(&session, "now", &RenderConfig::default());

        assert_eq!(page_breaks(&blocks), 1);
        let replies_at = blocks
            .iter()
            .position(|b| *b == Block::Subtitle("Replies".into()))
            .unwrap();
        assert_eq!(blocks[replies_at - 1], Block::PageBreak);
    }

    #[test]
    fn test_images_are_capped_and_text_cleaned() {
        let mut session = CrawlSession::new("someone", 1);
        session.append(
            FeedKind::Posts,
            Record {
                text: "line\u{2028}sep".into(),
                images: (0..5).map(|i| format!("https://cdn.example.com/{i}.jpg")).collect(),
                ..Default::default()
            },
        );

        let blocks = build(&session, "now", &RenderConfig::default());

        let images = blocks.iter().filter(|b| matches!(b, Block::Image(_))).count();
        assert_eq!(images, 3);
        assert!(blocks.contains(&Block::Body("line sep".into())));
    }

    #[test]
    fn test_permalink_is_labelled() {
        let mut session = CrawlSession::new("someone", 1);
        session.append(
            FeedKind::Posts,
            Record {
                text: "t".into(),
                url: "https://www.threads.net/t/1".into(),
                ..Default::default()
            },
        );

        let blocks = build(&session, "now", &RenderConfig::default());
        assert!(blocks.contains(&Block::Link("URL: https://www.threads.net/t/1".into())));
    }

    #[test]
    fn test_empty_session_has_only_header() {
        let session = CrawlSession::new("someone", 1);
        let blocks = build(&session, "now", &RenderConfig::default());
        assert_eq!(blocks.len(), 3);
    }
}
