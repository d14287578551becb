pub mod http_fetcher;

use std::time::Duration;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Only a plain 200 counts as a usable image.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<FetchResponse>;
}

/// Request headers sent with image downloads.
pub fn image_headers<'a>(user_agent: &'a str, referer: &'a str) -> [(&'static str, &'a str); 4] {
    [
        ("User-Agent", user_agent),
        ("Referer", referer),
        ("Accept", "image/webp,image/apng,image/*,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.9"),
    ]
}
