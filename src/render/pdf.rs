//! Paged document output via genpdf.
//!
//! Images are downloaded up front; the document itself is laid out
//! synchronously from [`document::build`] blocks.

use std::collections::HashMap;
use std::path::Path;

use genpdf::elements::{Break, Image, PageBreak, Paragraph};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Element as _, Scale};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use tracing::{debug, warn};

use crate::app::{Result, ScribeError};
use crate::domain::CrawlSession;
use crate::fetcher::ImageFetcher;
use crate::render::config::RenderConfig;
use crate::render::document::{self, Block};
use crate::render::download_image;

/// genpdf places images at this resolution unless told otherwise.
const IMAGE_DPI: f64 = 300.0;

const LINK_COLOR: Color = Color::Rgb(0, 0, 139);

/// Write the document. With `fetcher` set images are embedded, without it
/// the text-only variant is produced.
pub async fn write(
    session: &CrawlSession,
    path: &Path,
    generated_at: &str,
    config: &RenderConfig,
    fetcher: Option<&dyn ImageFetcher>,
) -> Result<()> {
    let mut blocks = document::build(session, generated_at, config);

    let mut images = HashMap::new();
    match fetcher {
        Some(fetcher) => {
            for block in &blocks {
                if let Block::Image(url) = block {
                    if images.contains_key(url) {
                        continue;
                    }
                    if let Some(image) = fetch_image(fetcher, url, config).await {
                        images.insert(url.clone(), image);
                    }
                }
            }
        }
        None => blocks.retain(|b| !matches!(b, Block::Image(_))),
    }

    render(&blocks, &images, session.target(), path, config)
}

async fn fetch_image(
    fetcher: &dyn ImageFetcher,
    url: &str,
    config: &RenderConfig,
) -> Option<DynamicImage> {
    let body = download_image(fetcher, url, config).await?;
    match image::load_from_memory(&body) {
        Ok(image) => Some(flatten_on_white(&image)),
        Err(e) => {
            warn!("Skipping undecodable image {}: {}", url, e);
            None
        }
    }
}

fn render(
    blocks: &[Block],
    images: &HashMap<String, DynamicImage>,
    target: &str,
    path: &Path,
    config: &RenderConfig,
) -> Result<()> {
    let fonts = genpdf::fonts::from_files(&config.font_dir, &config.font_family, None)
        .map_err(|e| {
            ScribeError::Render(format!(
                "loading font {} from {}: {}",
                config.font_family,
                config.font_dir.display(),
                e
            ))
        })?;

    let mut doc = genpdf::Document::new(fonts);
    doc.set_title(format!("Threads @{}", target));
    doc.set_paper_size(genpdf::PaperSize::Letter);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(18);
    doc.set_page_decorator(decorator);

    for block in blocks {
        match block {
            Block::Title(text) => doc.push(
                Paragraph::new(text.as_str())
                    .aligned(Alignment::Center)
                    .styled(Style::new().bold().with_font_size(18)),
            ),
            Block::Subtitle(text) => doc.push(
                Paragraph::new(text.as_str()).styled(Style::new().bold().with_font_size(15)),
            ),
            Block::Heading(text) => doc.push(
                Paragraph::new(text.as_str()).styled(Style::new().bold().with_font_size(12)),
            ),
            Block::Caption(text) => doc.push(
                Paragraph::new(text.as_str()).styled(Style::new().italic().with_font_size(9)),
            ),
            Block::Body(text) => {
                for line in text.split('\n') {
                    if line.trim().is_empty() {
                        doc.push(Break::new(0.5));
                    } else {
                        doc.push(Paragraph::new(line).styled(Style::new().with_font_size(10)));
                    }
                }
            }
            Block::Link(line) => doc.push(
                Paragraph::new(line.as_str())
                    .styled(Style::new().with_font_size(9).with_color(LINK_COLOR)),
            ),
            Block::Image(url) => {
                let Some(image) = images.get(url) else {
                    debug!("No image data for {}", url);
                    continue;
                };
                let (width, height) = image.dimensions();
                let ratio = fit_ratio(width, height, config.max_image_inches);
                match Image::from_dynamic_image(image.clone()) {
                    Ok(element) => {
                        doc.push(Break::new(0.5));
                        doc.push(
                            element
                                .with_alignment(Alignment::Center)
                                .with_scale(Scale::new(ratio, ratio)),
                        );
                    }
                    Err(e) => warn!("Skipping image {}: {}", url, e),
                }
            }
            Block::Spacer => doc.push(Break::new(1)),
            Block::PageBreak => doc.push(PageBreak::new()),
        }
    }

    doc.render_to_file(path)
        .map_err(|e| ScribeError::Render(format!("writing {}: {}", path.display(), e)))
}

/// Scale factor that shrinks the longer edge to at most `max_inches`.
/// Images that already fit keep their natural size.
pub fn fit_ratio(width: u32, height: u32, max_inches: f64) -> f64 {
    let longest = width.max(height);
    if longest == 0 {
        return 1.0;
    }
    (max_inches * IMAGE_DPI / f64::from(longest)).min(1.0)
}

/// Blend any alpha channel over white; genpdf rejects transparent images.
pub fn flatten_on_white(image: &DynamicImage) -> DynamicImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let flat = RgbImage::from_fn(width, height, |x, y| {
        let pixel = rgba.get_pixel(x, y);
        let alpha = f32::from(pixel[3]) / 255.0;
        let blend = |c: u8| (f32::from(c) * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])])
    });
    DynamicImage::ImageRgb8(flat)
}
