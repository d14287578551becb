use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for launching the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Browser window width in pixels (default: 1920)
    pub window_width: u32,

    /// Browser window height in pixels (default: 1080)
    pub window_height: u32,

    /// User agent string to use
    pub user_agent: Option<String>,

    /// Explicit path to a Chrome or Chromium binary
    pub chrome_executable: Option<PathBuf>,

    /// Additional command-line switches passed to the browser
    pub extra_args: Vec<String>,
}

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            chrome_executable: None,
            extra_args: Vec::new(),
        }
    }
}

impl DriverConfig {
    /// Well-known install locations probed when no executable is configured.
    pub const CANDIDATE_PATHS: [&'static str; 5] = [
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/lib/chromium/chromium",
    ];

    /// Resolve the browser binary: configured path, then `CHROME_PATH`, then
    /// the candidate list. `None` leaves detection to chromiumoxide.
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.chrome_executable {
            return Some(path.clone());
        }

        if let Some(path) = std::env::var_os("CHROME_PATH").map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }

        Self::CANDIDATE_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }
}
