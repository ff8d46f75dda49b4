//! Canonical HTML: one lenient parse, then a filtered re-serialization.
//!
//! The source tree is never mutated. Serialization walks it and skips what
//! the canonical form does not carry (technical elements, comments, unlisted
//! attributes); the result is parsed again so extractors always see exactly
//! what [`Document::serialize`] would emit.

use scraper::{ElementRef, Html, Node};

use harvest_common::{truncate, FetchedPage};

pub const JSON_LD_TYPE: &str = "application/ld+json";

const STRIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "canvas", "svg", "object", "embed",
];

const KEEP_ATTRS: &[&str] = &[
    "id",
    "class",
    "href",
    "src",
    "alt",
    "title",
    "rel",
    "name",
    "content",
    "type",
    "aria-label",
    "role",
    // read by the SEO extractor
    "property",
    "hreflang",
    "charset",
    "http-equiv",
    "lang",
    "xml:lang",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

// Children of these are emitted without entity escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

// The parser drops one leading newline inside these.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// A parsed canonical document.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Canonical markup. Stable: parsing it yields an identical document.
    pub fn serialize(&self) -> String {
        serialize(&self.html)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("html", &self.serialize())
            .finish()
    }
}

/// Build the canonical document for arbitrary, possibly malformed, markup.
/// Never fails; unclosed tags are recovered by the HTML5 tree builder.
pub fn canonicalize(raw_html: &str) -> Document {
    let parsed = Html::parse_document(raw_html);
    Document {
        html: Html::parse_document(&serialize(&parsed)),
    }
}

/// Canonicalize a fetched body and cut it to the per-page character budget.
pub fn canonical_page(url: &str, raw_html: &str, max_chars: usize) -> FetchedPage {
    let canonical = canonicalize(raw_html).serialize();
    let (canonical_html, truncated) = truncate(&canonical, max_chars);
    FetchedPage {
        url: url.to_string(),
        canonical_html,
        truncated,
    }
}

fn serialize(html: &Html) -> String {
    let mut out = String::new();
    if html.tree.root().children().any(|n| n.value().is_doctype()) {
        out.push_str("<!DOCTYPE html>");
    }
    write_element(html.root_element(), &mut out);
    out
}

fn write_element(el: ElementRef<'_>, out: &mut String) {
    let element = el.value();
    let name = element.name();

    out.push('<');
    out.push_str(name);

    let mut attrs: Vec<(&str, &str)> = element.attrs().filter(|(k, _)| keep_attr(k)).collect();
    attrs.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attr(value, out);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    let raw = RAW_TEXT_ELEMENTS.contains(&name);
    let mut first = true;
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                if first && LEADING_NEWLINE_ELEMENTS.contains(&name) && text.starts_with('\n') {
                    out.push('\n');
                }
                if raw {
                    out.push_str(text);
                } else {
                    escape_text(text, out);
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !is_stripped(child_el) {
                        write_element(child_el, out);
                    }
                }
            }
            // comments, processing instructions
            _ => {}
        }
        first = false;
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn is_stripped(el: ElementRef<'_>) -> bool {
    let element = el.value();
    let name = element.name();
    if !STRIP_TAGS.contains(&name) {
        return false;
    }
    !(name == "script" && element.attr("type") == Some(JSON_LD_TYPE))
}

fn keep_attr(name: &str) -> bool {
    if name.starts_with("on") {
        return false;
    }
    KEEP_ATTRS.contains(&name) || name.starts_with("data-")
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
