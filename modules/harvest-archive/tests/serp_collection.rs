mod harness;

use harness::{google_serp, search_page, timeout, ScriptedFetcher, TestHarness};
use harvest_archive::HarvestError;
use harvest_common::{ErrorKind, FetchError, SearchEngine, SerpRequest};

fn google_fetcher(fail: Option<(&'static str, u32)>) -> ScriptedFetcher {
    ScriptedFetcher::new("google").responder(move |url| {
        let (query, page) = search_page(url)?;
        if fail == Some((query.as_str(), page)) {
            return Some(Err(timeout(url)));
        }
        Some(Ok(google_serp(&query, page, 3)))
    })
}

#[tokio::test]
async fn failure_on_page_two_stops_only_that_query() {
    let h = TestHarness::new(
        ScriptedFetcher::new("site"),
        google_fetcher(Some(("окна", 2))),
        ScriptedFetcher::new("yandex"),
    );

    let request = SerpRequest::new(["окна", "двери"]).with_pages(3);
    let result = h
        .harvester
        .collect_serp(SearchEngine::Google, request)
        .await
        .unwrap();

    assert_eq!(result.engine, SearchEngine::Google);
    assert!(result.partial);

    let windows = &result.queries[0];
    assert_eq!(windows.query, "окна");
    assert_eq!(windows.requested_page_count, 3);
    assert_eq!(windows.pages_scanned, 1);
    assert_eq!(windows.error_kind, Some(ErrorKind::Timeout));
    assert_eq!(windows.pages.len(), 1);
    assert_eq!(windows.pages[0].page_number, 1);

    let doors = &result.queries[1];
    assert_eq!(doors.pages_scanned, 3);
    assert!(doors.error_kind.is_none());
    let numbers: Vec<u32> = doors.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    // page 3 of the failed query is never requested
    let calls = h.google.calls();
    assert_eq!(calls.len(), 2 + 3);
    assert!(!calls
        .iter()
        .any(|url| search_page(url) == Some(("окна".to_string(), 3))));
}

#[tokio::test]
async fn results_are_parsed_and_positioned() {
    let h = TestHarness::new(
        ScriptedFetcher::new("site"),
        google_fetcher(None),
        ScriptedFetcher::new("yandex"),
    );

    let result = h
        .harvester
        .collect_serp(SearchEngine::Google, SerpRequest::new(["rust"]).with_pages(1))
        .await
        .unwrap();

    assert!(!result.partial);
    let organic = &result.queries[0].pages[0].organic;
    assert_eq!(organic.len(), 3);
    assert_eq!(organic[0].position, 1);
    assert_eq!(organic[0].domain, "site1.example");
    assert_eq!(organic[0].title, "rust 1.1");
    assert_eq!(organic[2].snippet.as_deref(), Some("snippet 3"));
}

#[tokio::test]
async fn repeated_collection_is_served_from_cache() {
    let h = TestHarness::new(
        ScriptedFetcher::new("site"),
        google_fetcher(None),
        ScriptedFetcher::new("yandex"),
    );
    let request = SerpRequest::new(["rust", "tokio"]).with_pages(2);

    let first = h
        .harvester
        .collect_serp(SearchEngine::Google, request.clone())
        .await
        .unwrap();
    let calls_after_first = h.google.calls().len();
    assert_eq!(calls_after_first, 4);

    // whitespace differences normalize to the same request
    let second = h
        .harvester
        .collect_serp(
            SearchEngine::Google,
            SerpRequest::new([" rust ", "tokio", ""]).with_pages(2),
        )
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(h.google.calls().len(), calls_after_first);
}

#[tokio::test]
async fn engines_are_cached_separately() {
    let yandex = ScriptedFetcher::new("yandex").responder(|url| {
        Some(Err(FetchError::BlockedOrCaptcha {
            url: url.to_string(),
            marker: "showcaptcha".to_string(),
        }))
    });
    let h = TestHarness::new(ScriptedFetcher::new("site"), google_fetcher(None), yandex);
    let request = SerpRequest::new(["rust"]).with_pages(1);

    let google = h
        .harvester
        .collect_serp(SearchEngine::Google, request.clone())
        .await
        .unwrap();
    assert!(!google.partial);

    let yandex = h
        .harvester
        .collect_serp(SearchEngine::Yandex, request)
        .await
        .unwrap();
    assert!(yandex.partial);
    assert_eq!(yandex.queries[0].pages_scanned, 0);
    assert_eq!(
        yandex.queries[0].error_kind,
        Some(ErrorKind::BlockedOrCaptcha)
    );
    assert_eq!(h.yandex.calls().len(), 1);
}

#[tokio::test]
async fn pages_are_clamped_to_configured_maximum() {
    let limits = harvest_common::config::LimitsConfig {
        max_pages_per_query: 2,
        ..Default::default()
    };
    let h = TestHarness::with_limits(
        ScriptedFetcher::new("site"),
        google_fetcher(None),
        ScriptedFetcher::new("yandex"),
        limits,
        std::time::Duration::from_secs(60),
    );

    let result = h
        .harvester
        .collect_serp(SearchEngine::Google, SerpRequest::new(["rust"]).with_pages(5))
        .await
        .unwrap();
    assert_eq!(result.queries[0].requested_page_count, 2);
    assert_eq!(result.queries[0].pages_scanned, 2);
}

#[tokio::test]
async fn invalid_requests_are_rejected_before_fetching() {
    let h = TestHarness::new(
        ScriptedFetcher::new("site"),
        google_fetcher(None),
        ScriptedFetcher::new("yandex"),
    );

    let err = h
        .harvester
        .collect_serp(SearchEngine::Google, SerpRequest::new(["  "]))
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::BadRequest(_)));
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    let err = h
        .harvester
        .collect_serp(SearchEngine::Google, SerpRequest::new(["a", "b", "c", "d", "e", "f"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    assert!(h.google.calls().is_empty());
}
