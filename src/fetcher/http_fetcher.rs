use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use crate::app::{Result, ScribeError};
use crate::fetcher::{FetchResponse, ImageFetcher};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("threadscribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScribeError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<FetchResponse> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                header_map.insert(name, value);
            }
        }

        let response = self
            .client
            .get(url)
            .headers(header_map)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(FetchResponse { status, body })
    }
}
