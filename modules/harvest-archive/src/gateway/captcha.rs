use async_trait::async_trait;
use harvest_common::{FetchError, FetchResult};
use tracing::warn;

use super::PageFetcher;

/// Substrings that mark an anti-bot challenge instead of real content.
/// Matched case-insensitively against the raw HTML.
pub const CAPTCHA_MARKERS: &[&str] = &[
    "showcaptcha",
    "smartcaptcha",
    "captcha",
    "введите символы",
    "protect.yandex",
    "я не робот",
    "are you a robot",
];

/// The first marker found in `html`, if any.
pub fn detect_captcha(html: &str) -> Option<&'static str> {
    let lowered = html.to_lowercase();
    CAPTCHA_MARKERS
        .iter()
        .copied()
        .find(|marker| lowered.contains(marker))
}

/// Wraps a fetcher and turns challenge pages into `BlockedOrCaptcha`.
pub struct CaptchaGuard<F> {
    inner: F,
}

impl<F: PageFetcher> CaptchaGuard<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for CaptchaGuard<F> {
    async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        let html = self.inner.fetch_page(url).await?;
        if let Some(marker) = detect_captcha(&html) {
            warn!(url, fetcher = self.inner.name(), marker, "Captcha page detected");
            return Err(FetchError::BlockedOrCaptcha {
                url: url.to_string(),
                marker: marker.to_string(),
            });
        }
        Ok(html)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
