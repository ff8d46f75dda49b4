//! Remote fetch gateway: one call, one isolated browser session, one page.
//!
//! Failures come back as [`FetchError`] in the fixed taxonomy. Nothing here
//! retries; whether a failure is fatal is the orchestrator's call.

mod browser;
mod captcha;
mod limit;
mod search_url;

use std::sync::Arc;

use async_trait::async_trait;
use browserless_client::{BrowserlessClient, BrowserlessError, ContentOptions, ProxyConfig};
use harvest_common::config::{GatewayConfig, SerpDefaults};
use harvest_common::{AppConfig, FetchResult, SearchEngine};

pub use browser::BrowserGateway;
pub use captcha::{detect_captcha, CaptchaGuard, CAPTCHA_MARKERS};
pub use limit::ConcurrencyLimit;
pub use search_url::{search_url, SearchParams};

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Rendered HTML for `url`.
    async fn fetch_page(&self, url: &str) -> FetchResult<String>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// The three logical sources a harvester fetches from.
#[derive(Clone)]
pub struct Fetchers {
    pub site: Arc<dyn PageFetcher>,
    pub google: Arc<dyn PageFetcher>,
    pub yandex: Arc<dyn PageFetcher>,
}

impl Fetchers {
    pub fn for_engine(&self, engine: SearchEngine) -> &Arc<dyn PageFetcher> {
        match engine {
            SearchEngine::Google => &self.google,
            SearchEngine::Yandex => &self.yandex,
        }
    }

    /// Browserless-backed fetchers, each behind its own session limit.
    /// Yandex goes through the configured proxy (if any) and is screened for
    /// captcha pages.
    pub fn browserless(
        app: &AppConfig,
        gateway: &GatewayConfig,
        serp: &SerpDefaults,
    ) -> Result<Self, BrowserlessError> {
        let base = ContentOptions {
            timeout: gateway.page_timeout(),
            wait_until: gateway.wait_until.clone(),
            locale: None,
            proxy: None,
        };
        let token = app.browserless_token.as_deref();

        let site = BrowserlessClient::new(&app.browserless_url, token, base.clone())?;
        let google = BrowserlessClient::new(
            &app.browserless_url,
            token,
            ContentOptions {
                locale: Some(serp.default_locale.clone()),
                ..base.clone()
            },
        )?;

        let proxy = app.yandex_proxy_url.as_ref().map(|server| ProxyConfig {
            server: server.clone(),
            username: app.yandex_proxy_username.clone(),
            password: app.yandex_proxy_password.clone(),
        });
        let yandex = BrowserlessClient::new(
            &app.browserless_url,
            token,
            ContentOptions {
                locale: Some(serp.default_locale.clone()),
                proxy,
                ..base
            },
        )?;

        Ok(Self {
            site: Arc::new(ConcurrencyLimit::new(
                BrowserGateway::new("site", site),
                gateway.site_max_concurrency,
            )),
            google: Arc::new(ConcurrencyLimit::new(
                BrowserGateway::new("google", google),
                gateway.google_max_concurrency,
            )),
            yandex: Arc::new(CaptchaGuard::new(ConcurrencyLimit::new(
                BrowserGateway::new("yandex", yandex),
                gateway.yandex_max_concurrency,
            ))),
        })
    }
}
