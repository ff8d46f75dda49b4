// Harvester: the public entry point. Every workflow is cache-first: the
// request is validated, defaults are resolved, and the resulting snapshot
// is fingerprinted before any network work happens.

use std::sync::Arc;

use harvest_common::config::{LimitsConfig, SerpDefaults};
use harvest_common::{
    FetchedPage, SearchEngine, SerpCollectionResult, SerpRequest, SiteCrawlResult, SiteRequest,
};
use harvest_html::{
    canonicalize, extract_content, extract_seo, ContentReport, SeoReport, SerpLimits, SerpParser,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::cache::{CacheScope, FingerprintCache};
use crate::error::{CacheError, HarvestError, Result};
use crate::gateway::Fetchers;
use crate::{serp, site};

/// SEO analysis of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSeo {
    pub url: String,
    pub seo: SeoReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// Content analysis of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    #[serde(flatten)]
    pub content: ContentReport,
}

struct HarvesterInner {
    cache: FingerprintCache,
    fetchers: Fetchers,
    limits: LimitsConfig,
    serp_defaults: SerpDefaults,
    google: SerpParser,
    yandex: SerpParser,
}

#[derive(Clone)]
pub struct Harvester {
    inner: Arc<HarvesterInner>,
}

impl Harvester {
    pub fn new(
        cache: FingerprintCache,
        fetchers: Fetchers,
        limits: LimitsConfig,
        serp_defaults: SerpDefaults,
    ) -> Self {
        let serp_limits = SerpLimits {
            max_title_chars: limits.max_title_chars,
            max_snippet_chars: limits.max_snippet_chars,
        };
        let inner = HarvesterInner {
            cache,
            fetchers,
            google: SerpParser::new(SearchEngine::Google, serp_limits),
            yandex: SerpParser::new(SearchEngine::Yandex, serp_limits),
            limits,
            serp_defaults,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.inner.limits
    }

    // --- SERP ---

    /// Collect result pages for every query. Per-query failures stop that
    /// query early and mark the collection partial; they never fail the call.
    pub async fn collect_serp(
        &self,
        engine: SearchEngine,
        request: SerpRequest,
    ) -> Result<SerpCollectionResult> {
        let request = self.resolve_serp_request(request)?;
        let params = snapshot(&request)?;
        let inner = &*self.inner;
        let request = &request;

        inner
            .cache
            .get_or(CacheScope::Serp(engine), &params, move || async move {
                let fetcher = inner.fetchers.for_engine(engine);
                let parser = match engine {
                    SearchEngine::Google => &inner.google,
                    SearchEngine::Yandex => &inner.yandex,
                };
                info!(
                    engine = %engine,
                    queries = request.queries.len(),
                    pages = request.max_pages_per_query,
                    "serp: collecting"
                );
                Ok::<_, HarvestError>(serp::collect(fetcher.as_ref(), parser, engine, request).await)
            })
            .await
    }

    fn resolve_serp_request(&self, request: SerpRequest) -> Result<SerpRequest> {
        let mut request = request.validated(self.inner.limits.max_queries)?;
        let defaults = &self.inner.serp_defaults;

        request.max_pages_per_query = request
            .max_pages_per_query
            .min(self.inner.limits.max_pages_per_query.max(1));
        request.locale = Some(or_default(request.locale, &defaults.default_locale));
        request.geo = Some(or_default(request.geo, &defaults.default_geo));
        request.region = Some(or_default(request.region, &defaults.default_yandex_region));
        Ok(request)
    }

    // --- Site ---

    /// Fetch the root page and up to `max_pages - 1` same-site pages.
    /// A root failure fails the crawl; internal failures mark it partial.
    pub async fn crawl_site(&self, request: SiteRequest) -> Result<SiteCrawlResult> {
        let mut request = request.validated()?;
        request.max_pages = request.max_pages.min(self.inner.limits.max_site_pages.max(1));
        self.crawl_validated(request).await
    }

    async fn crawl_validated(&self, request: SiteRequest) -> Result<SiteCrawlResult> {
        let params = snapshot(&request)?;
        let inner = &*self.inner;
        let request = &request;

        inner
            .cache
            .get_or(CacheScope::Site, &params, move || async move {
                info!(url = %request.url, max_pages = request.max_pages, "site: crawling");
                let result = site::crawl(
                    inner.fetchers.site.as_ref(),
                    request,
                    inner.limits.max_html_chars_per_page,
                )
                .await?;
                info!(
                    url = %request.url,
                    pages = result.pages.len(),
                    partial = result.partial,
                    "site: crawl finished"
                );
                Ok::<_, HarvestError>(result)
            })
            .await
    }

    // --- Single page ---

    /// One canonical page, cached as a one-page crawl.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        let request = SiteRequest::single(url).validated()?;
        let crawl = self.crawl_validated(request).await?;
        crawl
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| HarvestError::Internal(format!("crawl of {url} returned no pages")))
    }

    pub async fn page_html(&self, url: &str) -> Result<String> {
        Ok(self.fetch_page(url).await?.canonical_html)
    }

    pub async fn page_seo(&self, url: &str, include_html: bool) -> Result<PageSeo> {
        let page = self.fetch_page(url).await?;
        let seo = extract_seo(&canonicalize(&page.canonical_html));
        Ok(PageSeo {
            url: page.url,
            seo,
            html: include_html.then_some(page.canonical_html),
        })
    }

    pub async fn page_content(&self, url: &str) -> Result<PageContent> {
        let page = self.fetch_page(url).await?;
        let content = extract_content(&canonicalize(&page.canonical_html));
        Ok(PageContent {
            url: page.url,
            content,
        })
    }

    // --- Maintenance ---

    /// Delete expired cache rows. Meant for a periodic task, not the request path.
    pub async fn sweep_expired(&self) -> Result<u64> {
        let removed = self.inner.cache.sweep_expired().await?;
        info!(removed, "cache: swept expired entries");
        Ok(removed)
    }
}

fn snapshot<T: Serialize>(request: &T) -> Result<Value> {
    serde_json::to_value(request).map_err(|e| HarvestError::Cache(CacheError::from(e)))
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
