use std::time::Instant;

use async_trait::async_trait;
use browserless_client::{BrowserlessClient, BrowserlessError};
use harvest_common::{FetchError, FetchResult};
use tracing::{info, warn};

use super::PageFetcher;

/// Browserless `/content`, one isolated session per call.
pub struct BrowserGateway {
    name: String,
    client: BrowserlessClient,
}

impl BrowserGateway {
    pub fn new(name: &str, client: BrowserlessClient) -> Self {
        Self {
            name: name.to_string(),
            client,
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserGateway {
    async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        info!(url, fetcher = %self.name, "Fetching page");
        let started = Instant::now();

        match self.client.content(url).await {
            Ok(html) => {
                info!(
                    url,
                    fetcher = %self.name,
                    bytes = html.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Fetched successfully"
                );
                Ok(html)
            }
            Err(e) => {
                let err = classify(url, e);
                warn!(
                    url,
                    fetcher = %self.name,
                    error_kind = %err.kind(),
                    error = %err,
                    "Fetch failed"
                );
                Err(err)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn classify(url: &str, error: BrowserlessError) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::SourceUnavailable {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}
