use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, ValidationError};

// --- Search engines ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Google,
    Yandex,
}

impl SearchEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Yandex => "yandex",
        }
    }
}

impl std::fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchEngine {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "yandex" => Ok(Self::Yandex),
            _ => Err(format!("Unknown search engine: {s}")),
        }
    }
}

// --- Site fetching ---

/// One retrieved page, already canonicalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    /// Canonical HTML, cut to the per-page character budget.
    #[serde(rename = "html")]
    pub canonical_html: String,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteCrawlResult {
    /// Root page first, then internal pages in completion order.
    pub pages: Vec<FetchedPage>,
    /// True iff at least one requested page failed to fetch.
    #[serde(default)]
    pub partial: bool,
}

pub const DEFAULT_SITE_PAGES: u32 = 4;
pub const MAX_SITE_PAGES_PER_REQUEST: u32 = 10;

fn default_site_pages() -> u32 {
    DEFAULT_SITE_PAGES
}

/// Site crawl parameters. Also the cache snapshot for the site scope, so every
/// field is a plain string or number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRequest {
    pub url: String,
    #[serde(default = "default_site_pages")]
    pub max_pages: u32,
}

impl SiteRequest {
    pub fn new(url: impl Into<String>, max_pages: u32) -> Self {
        Self {
            url: url.into(),
            max_pages,
        }
    }

    /// Single-page fetch: the `max_pages = 1` crawl scope.
    pub fn single(url: impl Into<String>) -> Self {
        Self::new(url, 1)
    }

    /// Check ranges and normalize the URL to its canonical string form.
    pub fn validated(self) -> Result<Self, ValidationError> {
        if !(1..=MAX_SITE_PAGES_PER_REQUEST).contains(&self.max_pages) {
            return Err(ValidationError::OutOfRange {
                field: "max_pages",
                value: self.max_pages,
                min: 1,
                max: MAX_SITE_PAGES_PER_REQUEST,
            });
        }
        let url = normalize_http_url(&self.url)?;
        Ok(Self {
            url,
            max_pages: self.max_pages,
        })
    }
}

/// Parse an absolute http(s) URL and return its serialized form.
pub fn normalize_http_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed).map_err(|e| ValidationError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(ValidationError::InvalidUrl {
            url: trimmed.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(parsed.to_string())
}

// --- SERP ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpResult {
    /// 1-based, order of appearance after filtering.
    pub position: u32,
    pub url: String,
    pub domain: String,
    pub title: String,
    pub snippet: Option<String>,
    #[serde(default)]
    pub truncated: bool,
}

/// Wire values of the ad `block` field. Parsers currently emit only `Top`;
/// the other variants keep the full wire vocabulary readable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdPlacement {
    #[default]
    Top,
    Bottom,
    Side,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpAd {
    pub position: u32,
    #[serde(rename = "block")]
    pub placement: AdPlacement,
    pub url: String,
    pub domain: String,
    pub title: String,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpPageResult {
    #[serde(rename = "page")]
    pub page_number: u32,
    #[serde(rename = "organic_results")]
    pub organic: Vec<SerpResult>,
    pub ads: Vec<SerpAd>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpQueryOutcome {
    pub query: String,
    #[serde(rename = "requested_pages")]
    pub requested_page_count: u32,
    /// Pages successfully obtained before any failure.
    pub pages_scanned: u32,
    /// Set only when scanning stopped early.
    #[serde(rename = "error_code")]
    pub error_kind: Option<ErrorKind>,
    pub pages: Vec<SerpPageResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpCollectionResult {
    pub engine: SearchEngine,
    /// True iff any query stopped early.
    #[serde(default)]
    pub partial: bool,
    pub queries: Vec<SerpQueryOutcome>,
}

pub const DEFAULT_PAGES_PER_QUERY: u32 = 3;
pub const MAX_PAGES_PER_QUERY: u32 = 5;
pub const DEFAULT_RESULTS_PER_PAGE: u32 = 10;
pub const MAX_RESULTS_PER_PAGE: u32 = 50;

fn default_pages_per_query() -> u32 {
    DEFAULT_PAGES_PER_QUERY
}

fn default_results_per_page() -> u32 {
    DEFAULT_RESULTS_PER_PAGE
}

/// SERP collection parameters. Doubles as the cache snapshot for the SERP scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpRequest {
    pub queries: Vec<String>,
    #[serde(default = "default_pages_per_query")]
    pub max_pages_per_query: u32,
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
    #[serde(default)]
    pub locale: Option<String>,
    /// Google `gl` parameter.
    #[serde(default)]
    pub geo: Option<String>,
    /// Yandex `lr` region id.
    #[serde(default)]
    pub region: Option<String>,
}

impl SerpRequest {
    pub fn new<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queries: queries.into_iter().map(Into::into).collect(),
            max_pages_per_query: DEFAULT_PAGES_PER_QUERY,
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
            locale: None,
            geo: None,
            region: None,
        }
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.max_pages_per_query = pages;
        self
    }

    pub fn with_results_per_page(mut self, n: u32) -> Self {
        self.results_per_page = n;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_geo(mut self, geo: impl Into<String>) -> Self {
        self.geo = Some(geo.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Trim queries, drop empty ones and check ranges.
    pub fn validated(self, max_queries: usize) -> Result<Self, ValidationError> {
        let queries: Vec<String> = self
            .queries
            .iter()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .map(String::from)
            .collect();

        if queries.is_empty() {
            return Err(ValidationError::NoQueries);
        }
        if queries.len() > max_queries {
            return Err(ValidationError::TooManyQueries {
                count: queries.len(),
                max: max_queries,
            });
        }
        if !(1..=MAX_PAGES_PER_QUERY).contains(&self.max_pages_per_query) {
            return Err(ValidationError::OutOfRange {
                field: "max_pages_per_query",
                value: self.max_pages_per_query,
                min: 1,
                max: MAX_PAGES_PER_QUERY,
            });
        }
        if !(1..=MAX_RESULTS_PER_PAGE).contains(&self.results_per_page) {
            return Err(ValidationError::OutOfRange {
                field: "results_per_page",
                value: self.results_per_page,
                min: 1,
                max: MAX_RESULTS_PER_PAGE,
            });
        }

        Ok(Self { queries, ..self })
    }
}
