use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use harvest_common::truncate;

use crate::document::Document;
use crate::dom::{attr, class_list, non_empty, selector, visible_text};

/// Scanning stops once this many blocks qualify.
pub const MAX_CONTENT_BLOCKS: usize = 100;
const TEXT_PREVIEW_CHARS: usize = 200;

/// Call-to-action phrases, matched case-insensitively as substrings.
const CTA_KEYWORDS: &[&str] = &[
    "купить",
    "заказать",
    "оформить",
    "записаться",
    "оставить заявку",
    "получить",
    "позвонить",
    "связаться",
    "рассчитать",
    "узнать цену",
    "консультац",
    "в корзину",
    "подписаться",
    "скачать",
    "попробовать",
    "buy",
    "order",
    "sign up",
    "subscribe",
    "get started",
    "contact us",
    "book",
    "add to cart",
    "try free",
    "download",
];

static CONTAINERS: LazyLock<Selector> = LazyLock::new(|| selector("section, article, div"));
static CTA_CANDIDATES: LazyLock<Selector> = LazyLock::new(|| selector("a, button"));
static FIRST_HEADINGS: LazyLock<[Selector; 3]> =
    LazyLock::new(|| [selector("h1"), selector("h2"), selector("h3")]);
static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static BUTTON: LazyLock<Selector> = LazyLock::new(|| selector("button"));
static HEADER: LazyLock<Selector> = LazyLock::new(|| selector("header, [role=banner]"));
static NAV: LazyLock<Selector> = LazyLock::new(|| selector("nav, [role=navigation]"));
static MAIN: LazyLock<Selector> = LazyLock::new(|| selector("main, [role=main]"));
static FOOTER: LazyLock<Selector> = LazyLock::new(|| selector("footer, [role=contentinfo]"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentReport {
    pub cta_buttons: Vec<CtaButton>,
    pub key_sections: KeySections,
    pub content_blocks: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtaButton {
    pub text: String,
    pub tag: String,
    pub href: Option<String>,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeySections {
    pub header: Option<String>,
    pub navigation: Option<String>,
    pub main: Option<String>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub tag: String,
    pub classes: Vec<String>,
    pub text_preview: String,
    pub heading: Option<String>,
    pub images: usize,
    pub links: usize,
    pub buttons: usize,
    /// Ancestor tag names below `body`, e.g. `main > section`.
    pub path: String,
}

pub fn extract_content(doc: &Document) -> ContentReport {
    ContentReport {
        cta_buttons: extract_cta(doc),
        key_sections: extract_key_sections(doc),
        content_blocks: extract_content_blocks(doc),
    }
}

pub fn extract_cta(doc: &Document) -> Vec<CtaButton> {
    doc.html()
        .select(&CTA_CANDIDATES)
        .filter_map(|el| {
            let text = visible_text(el);
            if text.is_empty() || !is_cta_text(&text) {
                return None;
            }
            Some(CtaButton {
                text,
                tag: el.value().name().to_string(),
                href: attr(el, "href"),
                classes: class_list(el),
            })
        })
        .collect()
}

fn is_cta_text(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CTA_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

pub fn extract_key_sections(doc: &Document) -> KeySections {
    KeySections {
        header: first_text(doc, &HEADER),
        navigation: first_text(doc, &NAV),
        main: first_text(doc, &MAIN),
        footer: first_text(doc, &FOOTER),
    }
}

fn first_text(doc: &Document, sel: &Selector) -> Option<String> {
    doc.html()
        .select(sel)
        .next()
        .and_then(|el| non_empty(visible_text(el)))
}

pub fn extract_content_blocks(doc: &Document) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    for el in doc.html().select(&CONTAINERS) {
        if blocks.len() >= MAX_CONTENT_BLOCKS {
            break;
        }
        if is_cookie_banner(el) {
            continue;
        }
        let text = visible_text(el);
        if text.is_empty() {
            continue;
        }
        let (text_preview, _) = truncate(&text, TEXT_PREVIEW_CHARS);
        blocks.push(ContentBlock {
            tag: el.value().name().to_string(),
            classes: class_list(el),
            text_preview,
            heading: first_heading(el),
            images: el.select(&IMG).count(),
            links: el.select(&ANCHOR).count(),
            buttons: el.select(&BUTTON).count(),
            path: ancestor_path(el),
        });
    }
    blocks
}

fn is_cookie_banner(el: ElementRef<'_>) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|classes| classes.to_lowercase().contains("cookie"))
}

/// Text of the first non-empty h1, else h2, else h3.
fn first_heading(el: ElementRef<'_>) -> Option<String> {
    FIRST_HEADINGS.iter().find_map(|sel| {
        el.select(sel)
            .map(visible_text)
            .find(|text| !text.is_empty())
    })
}

fn ancestor_path(el: ElementRef<'_>) -> String {
    let mut names: Vec<&str> = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(|a| a.value().name())
        .take_while(|name| *name != "body")
        .collect();
    names.reverse();
    names.join(" > ")
}
