// Site crawl: root page first, then every discovered internal link at once.
// Only the root is load-bearing; internal failures just mark the result partial.

use futures::stream::{FuturesUnordered, StreamExt};
use harvest_common::{FetchResult, SiteCrawlResult, SiteRequest};
use harvest_html::{canonical_page, extract_internal_links};
use tracing::{info, warn};

use crate::gateway::PageFetcher;

/// `request` must already be validated and clamped.
pub(crate) async fn crawl(
    fetcher: &dyn PageFetcher,
    request: &SiteRequest,
    max_html_chars: usize,
) -> FetchResult<SiteCrawlResult> {
    let root_html = fetcher.fetch_page(&request.url).await?;

    let link_budget = request.max_pages.saturating_sub(1) as usize;
    let links = extract_internal_links(&root_html, &request.url, link_budget);
    let root = canonical_page(&request.url, &root_html, max_html_chars);
    drop(root_html);

    info!(url = %request.url, internal_links = links.len(), "site: root fetched");

    let mut pending: FuturesUnordered<_> = links
        .into_iter()
        .map(|link| async move {
            let result = fetcher.fetch_page(&link).await;
            (link, result)
        })
        .collect();

    let mut pages = vec![root];
    let mut partial = false;

    // Completion order, not discovery order.
    while let Some((link, result)) = pending.next().await {
        match result {
            Ok(html) => pages.push(canonical_page(&link, &html, max_html_chars)),
            Err(e) => {
                warn!(
                    url = %link,
                    error_kind = %e.kind(),
                    error = %e,
                    "site: internal page failed, skipping"
                );
                partial = true;
            }
        }
    }

    Ok(SiteCrawlResult { pages, partial })
}
