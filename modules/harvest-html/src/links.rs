use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::dom::selector;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Same-site links found in a page's raw (pre-canonical) HTML.
///
/// - Relative hrefs resolve against the root's scheme and host
/// - Skips fragment-only, `mailto:`, `tel:` and `javascript:` hrefs
/// - Hosts compare equal after stripping a leading `www.`
/// - Fragments are dropped, the root itself is excluded
/// - Deduplicated in first-seen order, at most `limit` links
pub fn extract_internal_links(raw_html: &str, root_url: &str, limit: usize) -> Vec<String> {
    if limit == 0 {
        return Vec::new();
    }
    let Ok(mut root) = Url::parse(root_url) else {
        return Vec::new();
    };
    root.set_fragment(None);
    let Some(root_host) = root.host_str().map(bare_host) else {
        return Vec::new();
    };
    let Ok(base) = root.join("/") else {
        return Vec::new();
    };

    let document = Html::parse_document(raw_html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&ANCHOR) {
        let Some(href) = element.value().attr("href").map(str::trim) else {
            continue;
        };
        if is_skipped_href(href) {
            continue;
        }

        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        if resolved.host_str().map(bare_host) != Some(root_host.clone()) {
            continue;
        }
        resolved.set_fragment(None);
        if resolved == root {
            continue;
        }

        let link = resolved.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
            if links.len() >= limit {
                break;
            }
        }
    }

    links
}

fn is_skipped_href(href: &str) -> bool {
    let lowered = href.to_ascii_lowercase();
    href.is_empty()
        || href.starts_with('#')
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("javascript:")
}

fn bare_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}
