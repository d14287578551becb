pub mod commands;

use std::path::PathBuf;

use clap::Parser;

use crate::domain::FeedKind;
use crate::render::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "threadscribe")]
#[command(about = "Save a Threads profile's posts and replies to a document", long_about = None)]
pub struct Cli {
    /// Threads username to scrape (without the @ symbol)
    #[arg(short, long)]
    pub username: String,

    /// Directory to save the output files
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Maximum number of scrolls per feed (more scrolls = more posts)
    #[arg(short, long, default_value_t = 10)]
    pub max_scrolls: usize,

    /// Skip scraping posts
    #[arg(long)]
    pub skip_posts: bool,

    /// Skip scraping replies
    #[arg(long)]
    pub skip_replies: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Pdf)]
    pub output_format: OutputFormat,

    /// Read configuration from this file instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,
}

impl Cli {
    /// Feeds to crawl, posts before replies.
    pub fn passes(&self) -> Vec<FeedKind> {
        FeedKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                FeedKind::Posts => !self.skip_posts,
                FeedKind::Replies => !self.skip_replies,
            })
            .collect()
    }
}
