//! Configuration management for threadscribe.
//!
//! Configuration is read from `~/.config/threadscribe/config.toml` at startup,
//! or from the file given with `--config`. If the default file doesn't exist,
//! a default configuration with comments is created.

use crate::browser::DriverConfig;
use crate::crawler::CrawlerConfig;
use crate::render::RenderConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: DriverConfig,
    pub crawler: CrawlerConfig,
    pub render: RenderConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/threadscribe/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("threadscribe").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# threadscribe configuration
#
# Every key is optional; anything left out keeps its default.

[browser]
# Run the browser without a visible window
headless = true

# Window size in pixels
window_width = 1920
window_height = 1080

# Explicit Chrome/Chromium binary (otherwise CHROME_PATH, then common paths)
# chrome_executable = "/usr/bin/chromium"

# Additional command-line switches passed to the browser
extra_args = []

[crawler]
base_url = "https://www.threads.net"

# How long to wait for feed content to render (seconds)
ready_timeout_secs = 30

# Poll interval while waiting for content (milliseconds)
ready_poll_interval_ms = 2000

# Page markup shorter than this never counts as loaded
min_markup_len = 1000

# Pauses (milliseconds)
initial_settle_ms = 5000
element_settle_ms = 1000
scroll_settle_ms = 3000
nudge_settle_ms = 2000

# Feed entry selectors, tried in order until one matches
feed_selectors = [
    "article",
    "div[role='article']",
    "div[data-pressable-container='true']",
    "div._aabd._aa8k._al3l",
    "div[style*='flex-direction: column']",
]

# Redirects to URLs containing these mean the profile is not viewable
blocked_url_markers = ["login", "blocked"]

# Save debug_<kind>_page.png/.html when extraction starts
save_debug_snapshots = false

[render]
# TrueType files are expected as <font_family>-Regular.ttf, -Bold.ttf,
# -Italic.ttf and -BoldItalic.ttf inside font_dir
font_dir = "/usr/share/fonts/truetype/liberation"
font_family = "LiberationSans"

# Images downloaded per record
max_images_per_record = 3

# Timeout for a single image download (seconds)
image_timeout_secs = 10

# Longest edge of an embedded image (inches)
max_image_inches = 4.0

# Records per page before a page break
records_per_page = 3
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
