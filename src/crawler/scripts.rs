//! Page scripts issued by the crawl loop.

/// Small scroll down and back to coax lazy content into rendering.
pub const INITIAL_LOAD: &str = r#"
    window.scrollTo(0, 100);
    setTimeout(() => window.scrollTo(0, 0), 500);
"#;

/// Current document height in pixels.
pub const PAGE_HEIGHT: &str = "document.body.scrollHeight";

pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Second-chance scroll issued when the height did not change.
pub const NUDGE: &str = r#"
    window.scrollTo(0, document.body.scrollHeight);
    setTimeout(() => window.scrollTo(0, document.body.scrollHeight + 100), 500);
"#;
