use async_trait::async_trait;
use harvest_common::{FetchError, FetchResult};
use tokio::sync::Semaphore;
use tracing::info;

use super::PageFetcher;

/// Caps simultaneous fetches through one logical source.
pub struct ConcurrencyLimit<F> {
    inner: F,
    semaphore: Semaphore,
}

impl<F: PageFetcher> ConcurrencyLimit<F> {
    pub fn new(inner: F, max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        info!(fetcher = inner.name(), max_concurrency, "Fetcher initialized");
        Self {
            inner,
            semaphore: Semaphore::new(max_concurrency),
        }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for ConcurrencyLimit<F> {
    async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::SourceUnavailable {
                url: url.to_string(),
                reason: "gateway semaphore closed".to_string(),
            })?;
        self.inner.fetch_page(url).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
