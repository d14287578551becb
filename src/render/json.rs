use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::{CrawlSession, Record};

#[derive(Serialize)]
struct DumpRef<'a> {
    username: &'a str,
    posts: &'a [Record],
    replies: &'a [Record],
}

#[derive(Deserialize)]
struct Dump {
    username: String,
    #[serde(default)]
    posts: Vec<Record>,
    #[serde(default)]
    replies: Vec<Record>,
}

/// Serialize the session as pretty-printed JSON.
pub fn to_json(session: &CrawlSession) -> Result<String> {
    let dump = DumpRef {
        username: session.target(),
        posts: session.posts(),
        replies: session.replies(),
    };
    Ok(serde_json::to_string_pretty(&dump)?)
}

/// Write the structured dump. The last link of every fallback chain.
pub fn write(session: &CrawlSession, path: &Path) -> Result<()> {
    fs::write(path, to_json(session)?)?;
    Ok(())
}

/// Read a dump back into a session. The scroll budget is not stored and
/// comes back as zero.
pub fn load(path: &Path) -> Result<CrawlSession> {
    let content = fs::read_to_string(path)?;
    let dump: Dump = serde_json::from_str(&content)?;
    Ok(CrawlSession::restore(dump.username, 0, dump.posts, dump.replies))
}
