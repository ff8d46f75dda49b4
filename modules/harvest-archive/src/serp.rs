// SERP collection: queries run one after another, pages within a query
// strictly in order. A failed page ends that query only.

use harvest_common::{
    SearchEngine, SerpCollectionResult, SerpPageResult, SerpQueryOutcome, SerpRequest,
};
use harvest_html::{canonicalize, SerpParser};
use tracing::{info, warn};

use crate::gateway::{search_url, PageFetcher, SearchParams};

/// `request` must already be validated with every default resolved.
pub(crate) async fn collect(
    fetcher: &dyn PageFetcher,
    parser: &SerpParser,
    engine: SearchEngine,
    request: &SerpRequest,
) -> SerpCollectionResult {
    let params = SearchParams {
        results_per_page: request.results_per_page,
        locale: request.locale.as_deref().unwrap_or_default(),
        geo: request.geo.as_deref().unwrap_or_default(),
        region: request.region.as_deref().unwrap_or_default(),
    };

    let mut queries = Vec::with_capacity(request.queries.len());
    for query in &request.queries {
        let outcome = collect_query(
            fetcher,
            parser,
            engine,
            query,
            request.max_pages_per_query,
            &params,
        )
        .await;
        queries.push(outcome);
    }

    let partial = queries.iter().any(|q| q.error_kind.is_some());
    SerpCollectionResult {
        engine,
        partial,
        queries,
    }
}

async fn collect_query(
    fetcher: &dyn PageFetcher,
    parser: &SerpParser,
    engine: SearchEngine,
    query: &str,
    max_pages: u32,
    params: &SearchParams<'_>,
) -> SerpQueryOutcome {
    let mut pages = Vec::new();
    let mut error_kind = None;

    for page in 1..=max_pages {
        let url = search_url(engine, query, page, params);
        match fetcher.fetch_page(&url).await {
            Ok(html) => {
                let parsed = parse_page(parser, &html, page);
                info!(
                    engine = %engine,
                    query,
                    page,
                    organic = parsed.organic.len(),
                    ads = parsed.ads.len(),
                    "serp: page parsed"
                );
                pages.push(parsed);
            }
            Err(e) => {
                warn!(
                    engine = %engine,
                    query,
                    page,
                    error_kind = %e.kind(),
                    error = %e,
                    "serp: stopping query early"
                );
                error_kind = Some(e.kind());
                break;
            }
        }
    }

    SerpQueryOutcome {
        query: query.to_string(),
        requested_page_count: max_pages,
        pages_scanned: pages.len() as u32,
        error_kind,
        pages,
    }
}

// Keeps the parsed document out of the async state machine.
fn parse_page(parser: &SerpParser, html: &str, page: u32) -> SerpPageResult {
    let doc = canonicalize(html);
    parser.parse(&doc, page)
}
