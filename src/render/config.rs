use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::config::DEFAULT_USER_AGENT;

/// Configuration for output rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory holding the TrueType files of `font_family`
    pub font_dir: PathBuf,

    /// Font family name; files are expected as `<name>-Regular.ttf` etc.
    pub font_family: String,

    /// Images downloaded per record (default: 3)
    pub max_images_per_record: usize,

    /// Timeout for a single image download, in seconds (default: 10)
    pub image_timeout_secs: u64,

    /// Largest edge of an embedded image, in inches (default: 4.0)
    pub max_image_inches: f64,

    /// Records per page before a page break (default: 3)
    pub records_per_page: usize,

    /// User agent sent with image downloads
    pub user_agent: String,

    /// Referer sent with image downloads; set from `crawler.base_url`
    #[serde(skip)]
    pub referer: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_dir: PathBuf::from("/usr/share/fonts/truetype/liberation"),
            font_family: "LiberationSans".to_string(),
            max_images_per_record: 3,
            image_timeout_secs: 10,
            max_image_inches: 4.0,
            records_per_page: 3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: "https://www.threads.net/".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }
}
