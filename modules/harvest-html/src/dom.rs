use scraper::{ElementRef, Node, Selector};

use harvest_common::collapse_whitespace;

/// Elements that break a line when rendered. Text on either side of one is
/// separated by a space; inline markup joins text as-is.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "option", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Compile a statically known selector. Only for literals in `LazyLock`s.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Text a reader would see, whitespace-collapsed. Skips script/style/template
/// subtrees (JSON-LD survives canonicalization but is not visible text).
pub(crate) fn visible_text(el: ElementRef<'_>) -> String {
    let mut buf = String::new();
    push_visible_text(el, &mut buf);
    collapse_whitespace(&buf)
}

fn push_visible_text(el: ElementRef<'_>, buf: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(element) => {
                let name = element.name();
                if matches!(name, "script" | "style" | "template") {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    buf.push(' ');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_visible_text(child_el, buf);
                }
                if block {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Raw concatenated text of every descendant text node, untouched.
pub(crate) fn raw_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Classes in attribute order.
pub(crate) fn class_list(el: ElementRef<'_>) -> Vec<String> {
    el.value()
        .attr("class")
        .map(|classes| classes.split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

/// Trimmed attribute value, `None` when missing or blank.
pub(crate) fn attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

pub(crate) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
