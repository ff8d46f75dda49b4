use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use crate::document::{Document, JSON_LD_TYPE};
use crate::dom::{attr, non_empty, raw_text, selector, visible_text};

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("head title, title"));
static META: LazyLock<Selector> = LazyLock::new(|| selector("meta"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("link[href]"));
static SCRIPT: LazyLock<Selector> = LazyLock::new(|| selector("script[type]"));
static HEADINGS: LazyLock<[Selector; 6]> = LazyLock::new(|| {
    [
        selector("h1"),
        selector("h2"),
        selector("h3"),
        selector("h4"),
        selector("h5"),
        selector("h6"),
    ]
});
static CHARSET_IN_CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9_\-:.]+)"#).expect("valid regex")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoReport {
    pub meta: MetaTags,
    pub open_graph: OpenGraph,
    pub headings: Headings,
    /// Verbatim JSON-LD bodies, not parsed.
    pub json_ld: Vec<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaTags {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub robots: Option<String>,
    pub viewport: Option<String>,
    pub canonical: Option<String>,
    pub hreflang: Vec<Hreflang>,
    pub charset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hreflang {
    pub hreflang: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub og_type: Option<String>,
    pub url: Option<String>,
    pub site_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

pub fn extract_seo(doc: &Document) -> SeoReport {
    SeoReport {
        meta: extract_meta(doc),
        open_graph: extract_open_graph(doc),
        headings: extract_headings(doc),
        json_ld: extract_json_ld(doc),
        lang: attr(doc.root(), "lang").or_else(|| attr(doc.root(), "xml:lang")),
    }
}

fn extract_meta(doc: &Document) -> MetaTags {
    let html = doc.html();
    let mut meta = MetaTags {
        title: html
            .select(&TITLE)
            .next()
            .and_then(|el| non_empty(visible_text(el))),
        ..Default::default()
    };

    for el in html.select(&META) {
        if meta.charset.is_none() {
            meta.charset = attr(el, "charset");
        }

        let Some(name) = attr(el, "name") else {
            continue;
        };
        let slot = match name.to_ascii_lowercase().as_str() {
            "description" => &mut meta.description,
            "keywords" => &mut meta.keywords,
            "robots" => &mut meta.robots,
            "viewport" => &mut meta.viewport,
            _ => continue,
        };
        if slot.is_none() {
            *slot = attr(el, "content");
        }
    }

    if meta.charset.is_none() {
        meta.charset = html
            .select(&META)
            .filter(|el| {
                el.value()
                    .attr("http-equiv")
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"))
            })
            .filter_map(|el| el.value().attr("content"))
            .find_map(|content| {
                CHARSET_IN_CONTENT_TYPE
                    .captures(content)
                    .map(|caps| caps[1].to_string())
            });
    }

    for el in html.select(&LINK) {
        let Some(href) = attr(el, "href") else {
            continue;
        };
        if meta.canonical.is_none() && has_rel(el, "canonical") {
            meta.canonical = Some(href.clone());
        }
        if has_rel(el, "alternate") {
            if let Some(hreflang) = attr(el, "hreflang") {
                meta.hreflang.push(Hreflang { hreflang, href });
            }
        }
    }

    meta
}

fn has_rel(el: ElementRef<'_>, token: &str) -> bool {
    el.value()
        .attr("rel")
        .is_some_and(|rel| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case(token)))
}

fn extract_open_graph(doc: &Document) -> OpenGraph {
    let mut og = OpenGraph::default();
    for el in doc.html().select(&META) {
        let Some(property) = attr(el, "property") else {
            continue;
        };
        let slot = match property.to_ascii_lowercase().as_str() {
            "og:title" => &mut og.title,
            "og:description" => &mut og.description,
            "og:image" => &mut og.image,
            "og:type" => &mut og.og_type,
            "og:url" => &mut og.url,
            "og:site_name" => &mut og.site_name,
            _ => continue,
        };
        if slot.is_none() {
            *slot = attr(el, "content");
        }
    }
    og
}

fn extract_headings(doc: &Document) -> Headings {
    let [h1, h2, h3, h4, h5, h6] = HEADINGS.each_ref().map(|sel| {
        doc.html()
            .select(sel)
            .map(visible_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
    });
    Headings {
        h1,
        h2,
        h3,
        h4,
        h5,
        h6,
    }
}

fn extract_json_ld(doc: &Document) -> Vec<String> {
    doc.html()
        .select(&SCRIPT)
        .filter(|el| el.value().attr("type") == Some(JSON_LD_TYPE))
        .map(|el| raw_text(el).trim().to_string())
        .filter(|body| !body.is_empty())
        .collect()
}
