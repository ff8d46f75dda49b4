use scraper::{ElementRef, Selector};
use url::Url;

use harvest_common::SearchEngine;

use crate::document::Document;

/// One way of locating results on a page. All fields are CSS selectors;
/// `link`, `title` and `snippet` are evaluated inside each container.
#[derive(Debug, Clone, Copy)]
pub struct ResultStrategy {
    pub container: &'static str,
    pub link: &'static str,
    pub title: &'static str,
    pub snippet: Option<&'static str>,
    /// Containers matching (or containing a match for) this are skipped.
    pub exclude: Option<&'static str>,
}

/// Everything needed to read one engine's result pages.
#[derive(Debug, Clone, Copy)]
pub struct EngineMarkup {
    pub engine: SearchEngine,
    /// Relative result links resolve against this.
    pub base_url: &'static str,
    pub organic: &'static [ResultStrategy],
    pub ads: &'static [ResultStrategy],
}

pub struct CompiledMarkup {
    pub(super) engine: SearchEngine,
    pub(super) base_url: Url,
    pub(super) organic: Vec<CompiledStrategy>,
    pub(super) ads: Vec<CompiledStrategy>,
}

impl CompiledMarkup {
    pub fn compile(markup: &EngineMarkup) -> Result<Self, String> {
        let base_url = Url::parse(markup.base_url)
            .map_err(|e| format!("bad base url {}: {e}", markup.base_url))?;
        Ok(Self {
            engine: markup.engine,
            base_url,
            organic: compile_all(markup.organic)?,
            ads: compile_all(markup.ads)?,
        })
    }
}

pub(super) struct CompiledStrategy {
    pub(super) container: Selector,
    pub(super) link: Selector,
    pub(super) title: Selector,
    pub(super) snippet: Option<Selector>,
    pub(super) exclude: Option<Selector>,
}

fn compile_all(strategies: &[ResultStrategy]) -> Result<Vec<CompiledStrategy>, String> {
    strategies.iter().map(compile).collect()
}

fn compile(strategy: &ResultStrategy) -> Result<CompiledStrategy, String> {
    Ok(CompiledStrategy {
        container: parse(strategy.container)?,
        link: parse(strategy.link)?,
        title: parse(strategy.title)?,
        snippet: strategy.snippet.map(parse).transpose()?,
        exclude: strategy.exclude.map(parse).transpose()?,
    })
}

fn parse(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector {css:?}: {e:?}"))
}

/// The first strategy with at least one usable container, and those containers.
pub(super) fn first_matching<'a, 's>(
    doc: &'a Document,
    strategies: &'s [CompiledStrategy],
) -> Option<(&'s CompiledStrategy, Vec<ElementRef<'a>>)> {
    strategies.iter().find_map(|strategy| {
        let containers: Vec<ElementRef<'a>> = doc
            .html()
            .select(&strategy.container)
            .filter(|el| !is_excluded(*el, strategy))
            .collect();
        if containers.is_empty() {
            None
        } else {
            Some((strategy, containers))
        }
    })
}

fn is_excluded(el: ElementRef<'_>, strategy: &CompiledStrategy) -> bool {
    match &strategy.exclude {
        Some(exclude) => exclude.matches(&el) || el.select(exclude).next().is_some(),
        None => false,
    }
}
