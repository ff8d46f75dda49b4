//! Scripted gateway for orchestrator tests: serves fixed HTML per URL,
//! fails on chosen URLs, and records every call.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use harvest_archive::{Fetchers, FingerprintCache, Harvester, MemoryCacheStore, PageFetcher};
use harvest_common::config::{LimitsConfig, SerpDefaults};
use harvest_common::{FetchError, FetchResult};

type Responder = dyn Fn(&str) -> Option<FetchResult<String>> + Send + Sync;

pub struct ScriptedFetcher {
    name: String,
    pages: HashMap<String, FetchResult<String>>,
    responder: Option<Box<Responder>>,
    calls: Mutex<Vec<String>>,
    delays: HashMap<String, Duration>,
}

impl ScriptedFetcher {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pages: HashMap::new(),
            responder: None,
            calls: Mutex::new(Vec::new()),
            delays: HashMap::new(),
        }
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(html.to_string()));
        self
    }

    pub fn failing(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    pub fn delayed(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Fallback for URLs without a fixed entry.
    pub fn responder(
        mut self,
        f: impl Fn(&str) -> Option<FetchResult<String>> + Send + Sync + 'static,
    ) -> Self {
        self.responder = Some(Box::new(f));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(result) = self.pages.get(url) {
            return result.clone();
        }
        if let Some(result) = self.responder.as_ref().and_then(|f| f(url)) {
            return result;
        }
        Err(FetchError::SourceUnavailable {
            url: url.to_string(),
            reason: "no scripted page".to_string(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub fn timeout(url: &str) -> FetchError {
    FetchError::Timeout {
        url: url.to_string(),
    }
}

pub fn unavailable(url: &str) -> FetchError {
    FetchError::SourceUnavailable {
        url: url.to_string(),
        reason: "connection refused".to_string(),
    }
}

/// (query, 1-based page) for a Google or Yandex search URL built by the gateway.
pub fn search_page(url: &str) -> Option<(String, u32)> {
    let parsed = url::Url::parse(url).ok()?;
    let pairs: HashMap<String, String> = parsed.query_pairs().into_owned().collect();
    if let Some(q) = pairs.get("q") {
        let start: u32 = pairs.get("start")?.parse().ok()?;
        let num: u32 = pairs.get("num")?.parse().ok()?;
        return Some((q.clone(), start / num + 1));
    }
    let text = pairs.get("text")?;
    let p: u32 = pairs.get("p")?.parse().ok()?;
    Some((text.clone(), p + 1))
}

/// Minimal Google result page with `count` organic results.
pub fn google_serp(query: &str, page: u32, count: u32) -> String {
    let results: String = (1..=count)
        .map(|i| {
            format!(
                r#"<div class="g"><a href="https://www.site{i}.example/{page}"><h3>{query} {page}.{i}</h3></a><div class="VwiC3b">snippet {i}</div></div>"#
            )
        })
        .collect();
    format!(r#"<html><body><div id="search">{results}</div></body></html>"#)
}

pub struct TestHarness {
    pub harvester: Harvester,
    pub store: Arc<MemoryCacheStore>,
    pub site: Arc<ScriptedFetcher>,
    pub google: Arc<ScriptedFetcher>,
    pub yandex: Arc<ScriptedFetcher>,
}

impl TestHarness {
    pub fn new(site: ScriptedFetcher, google: ScriptedFetcher, yandex: ScriptedFetcher) -> Self {
        Self::with_limits(site, google, yandex, LimitsConfig::default(), Duration::from_secs(3600))
    }

    pub fn with_limits(
        site: ScriptedFetcher,
        google: ScriptedFetcher,
        yandex: ScriptedFetcher,
        limits: LimitsConfig,
        ttl: Duration,
    ) -> Self {
        let store = Arc::new(MemoryCacheStore::new());
        let site = Arc::new(site);
        let google = Arc::new(google);
        let yandex = Arc::new(yandex);
        let fetchers = Fetchers {
            site: site.clone(),
            google: google.clone(),
            yandex: yandex.clone(),
        };
        let harvester = Harvester::new(
            FingerprintCache::new(store.clone(), ttl),
            fetchers,
            limits,
            SerpDefaults::default(),
        );
        Self {
            harvester,
            store,
            site,
            google,
            yandex,
        }
    }
}
