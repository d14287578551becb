use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::app::Result;
use crate::browser::{BrowserDriver, ChromeDriver};
use crate::cli::Cli;
use crate::config::Config;
use crate::crawler::{crawl_profile, CrawlerConfig, PassOutcome, Readiness, StopReason};
use crate::domain::{CrawlSession, FeedKind};
use crate::fetcher::HttpFetcher;
use crate::render::{json, OutputFormat, RenderConfig, RenderStep, Renderer};

/// Crawl the requested feeds and write the output document.
///
/// Only a browser that cannot be started is an error; everything after that
/// degrades to whatever could be collected and written.
pub async fn scrape(cli: &Cli, config: &Config) -> Result<()> {
    fs::create_dir_all(&cli.output_dir)?;
    let output_path = output_file(&cli.output_dir, &cli.username, cli.output_format, Local::now());

    let mut driver_config = config.browser.clone();
    if cli.headful {
        driver_config.headless = false;
    }

    let mut driver = match ChromeDriver::launch(&driver_config).await {
        Ok(driver) => driver,
        Err(e) => {
            error!("Error setting up Chrome driver: {}", e);
            print_troubleshooting();
            return Err(e);
        }
    };

    let mut session = CrawlSession::new(cli.username.clone(), cli.max_scrolls);
    let outcomes = collect(
        &mut driver,
        &config.crawler,
        &mut session,
        &cli.passes(),
        &cli.output_dir,
    )
    .await;

    for outcome in &outcomes {
        println!("{}", describe_outcome(outcome));
    }

    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    match write_output(&session, config, cli.output_format, &output_path, &generated_at).await {
        Some(path) => println!(
            "Saved {} posts and {} replies to {}",
            session.posts().len(),
            session.replies().len(),
            path.display()
        ),
        None => println!("No output file could be written"),
    }

    Ok(())
}

/// Run the passes and release the browser, whatever the passes did.
pub async fn collect<D: BrowserDriver>(
    driver: &mut D,
    config: &CrawlerConfig,
    session: &mut CrawlSession,
    passes: &[FeedKind],
    diagnostics_dir: &Path,
) -> Vec<PassOutcome> {
    let outcomes = crawl_profile(&*driver, config, session, passes, diagnostics_dir).await;

    if let Err(e) = driver.quit().await {
        warn!("Failed to close browser cleanly: {}", e);
    }

    outcomes
}

async fn write_output(
    session: &CrawlSession,
    config: &Config,
    format: OutputFormat,
    path: &Path,
    generated_at: &str,
) -> Option<PathBuf> {
    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("Could not create HTTP client: {}", e);
            let dump = RenderStep::StructuredDump.output_path(path);
            return match json::write(session, &dump) {
                Ok(()) => Some(dump),
                Err(e) => {
                    error!("Error writing {}: {}", dump.display(), e);
                    None
                }
            };
        }
    };

    let render_config = render_settings(config);
    let renderer = Renderer::new(session, &render_config, &fetcher, generated_at);
    match renderer.render(format, path).await {
        Ok(written) => Some(written),
        Err(e) => {
            error!("All output formats failed: {}", e);
            None
        }
    }
}

/// Render settings with image requests referred from the crawled site.
pub fn render_settings(config: &Config) -> RenderConfig {
    let mut render = config.render.clone();
    render.referer = format!("{}/", config.crawler.base_url.trim_end_matches('/'));
    render
}

/// `<dir>/<username>_threads_<YYYYmmdd_HHMMSS>.<ext>`
pub fn output_file(dir: &Path, username: &str, format: OutputFormat, now: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "{}_threads_{}.{}",
        username,
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

pub fn describe_outcome(outcome: &PassOutcome) -> String {
    let stop = match &outcome.stop {
        StopReason::NotReady(Readiness::Blocked { url }) => {
            format!("profile not viewable, redirected to {}", url)
        }
        StopReason::NotReady(_) => "content never loaded".to_string(),
        StopReason::ReachedBottom => "reached the bottom of the page".to_string(),
        StopReason::AttemptCap => "scroll limit reached".to_string(),
        StopReason::DriverFailure(e) => format!("browser error: {}", e),
    };
    format!(
        "Collected {} {} after {} scrolls ({})",
        outcome.collected, outcome.kind, outcome.attempts, stop
    )
}

fn print_troubleshooting() {
    info!("Browser launch failed; printing troubleshooting steps");
    println!("\nTroubleshooting steps:");
    println!("1. Make sure Chrome or Chromium is installed");
    println!("   Debian/Ubuntu: sudo apt install chromium");
    println!("   macOS: brew install --cask google-chrome");
    println!("2. Check that the browser is on your PATH: which chromium google-chrome");
    println!("3. Point threadscribe at the binary with CHROME_PATH=/path/to/chrome");
    println!("   or set `chrome_executable` under [browser] in the config file");
}
