//! Search result page extraction.
//!
//! Engines change their markup often, so each engine is described as data:
//! ordered lists of [`ResultStrategy`] for organic results and for ads. The
//! first strategy whose container selector matches anything wins; a page
//! that matches nothing yields an empty result rather than an error.

mod google;
mod strategy;
mod yandex;

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use scraper::ElementRef;
use url::Url;

use harvest_common::{truncate, AdPlacement, SearchEngine, SerpAd, SerpPageResult, SerpResult};

use crate::document::Document;
use crate::dom::visible_text;

pub use strategy::{CompiledMarkup, EngineMarkup, ResultStrategy};

static GOOGLE: LazyLock<Arc<CompiledMarkup>> = LazyLock::new(|| {
    Arc::new(CompiledMarkup::compile(&google::MARKUP).expect("valid google selectors"))
});
static YANDEX: LazyLock<Arc<CompiledMarkup>> = LazyLock::new(|| {
    Arc::new(CompiledMarkup::compile(&yandex::MARKUP).expect("valid yandex selectors"))
});

/// Independent length limits for result text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerpLimits {
    pub max_title_chars: usize,
    pub max_snippet_chars: usize,
}

impl Default for SerpLimits {
    fn default() -> Self {
        Self {
            max_title_chars: 512,
            max_snippet_chars: 1024,
        }
    }
}

#[derive(Clone)]
pub struct SerpParser {
    markup: Arc<CompiledMarkup>,
    limits: SerpLimits,
}

impl SerpParser {
    pub fn new(engine: SearchEngine, limits: SerpLimits) -> Self {
        let markup = match engine {
            SearchEngine::Google => GOOGLE.clone(),
            SearchEngine::Yandex => YANDEX.clone(),
        };
        Self { markup, limits }
    }

    /// Parser over caller-supplied markup strategies.
    pub fn with_markup(markup: &EngineMarkup, limits: SerpLimits) -> Result<Self, String> {
        Ok(Self {
            markup: Arc::new(CompiledMarkup::compile(markup)?),
            limits,
        })
    }

    pub fn engine(&self) -> SearchEngine {
        self.markup.engine
    }

    pub fn parse(&self, doc: &Document, page_number: u32) -> SerpPageResult {
        let base = &self.markup.base_url;

        let organic = self
            .entries(doc, &self.markup.organic, base)
            .into_iter()
            .zip(1u32..)
            .map(|(entry, position)| {
                let (title, title_cut) = truncate(&entry.title, self.limits.max_title_chars);
                let (snippet, snippet_cut) = match entry.snippet {
                    Some(text) => {
                        let (text, cut) = truncate(&text, self.limits.max_snippet_chars);
                        (Some(text), cut)
                    }
                    None => (None, false),
                };
                SerpResult {
                    position,
                    domain: bare_domain(&entry.url),
                    url: entry.url.into(),
                    title,
                    snippet,
                    truncated: title_cut || snippet_cut,
                }
            })
            .collect();

        let ads = self
            .entries(doc, &self.markup.ads, base)
            .into_iter()
            .zip(1u32..)
            .map(|(entry, position)| {
                let (title, truncated) = truncate(&entry.title, self.limits.max_title_chars);
                SerpAd {
                    position,
                    placement: AdPlacement::Top,
                    domain: bare_domain(&entry.url),
                    url: entry.url.into(),
                    title,
                    truncated,
                }
            })
            .collect();

        SerpPageResult {
            page_number,
            organic,
            ads,
        }
    }

    fn entries(
        &self,
        doc: &Document,
        strategies: &[strategy::CompiledStrategy],
        base: &Url,
    ) -> Vec<Entry> {
        let Some((strategy, containers)) = strategy::first_matching(doc, strategies) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        containers
            .into_iter()
            .filter_map(|container| read_entry(container, strategy, base))
            .filter(|entry| seen.insert(entry.url.to_string()))
            .collect()
    }
}

struct Entry {
    url: Url,
    title: String,
    snippet: Option<String>,
}

fn read_entry(
    container: ElementRef<'_>,
    strategy: &strategy::CompiledStrategy,
    base: &Url,
) -> Option<Entry> {
    let link = container
        .select(&strategy.link)
        .find(|a| a.value().attr("href").is_some())?;
    let url = resolve_result_url(link.value().attr("href")?, base)?;

    let title = container
        .select(&strategy.title)
        .map(visible_text)
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| visible_text(link));
    if title.is_empty() {
        return None;
    }

    let snippet = strategy.snippet.as_ref().and_then(|sel| {
        container
            .select(sel)
            .map(visible_text)
            .find(|t| !t.is_empty())
    });

    Some(Entry {
        url,
        title,
        snippet,
    })
}

/// Absolute http(s) URL for a result href, unwrapping `/url?q=` redirects.
pub fn resolve_result_url(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.path() == "/url" && url.host_str() == base.host_str() {
        let target = url
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .map(|(_, v)| v.into_owned())?;
        url = Url::parse(&target).ok()?;
    }

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Host with a single leading `www.` removed.
pub fn bare_domain(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}
