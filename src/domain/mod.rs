pub mod record;
pub mod session;

pub use record::Record;
pub use session::{CrawlSession, FeedKind};
