use harvest_common::SearchEngine;

use super::strategy::{EngineMarkup, ResultStrategy};

const AD_MARKERS: &str = "[data-text-ad], #tads, #tadsb";

pub(super) const MARKUP: EngineMarkup = EngineMarkup {
    engine: SearchEngine::Google,
    base_url: "https://www.google.com/",
    organic: &[
        // Desktop layout: one div.g per result.
        ResultStrategy {
            container: "#search div.g",
            link: "a[href]",
            title: "h3",
            snippet: Some("div.VwiC3b, div[data-sncf], span.aCOpRe, div.IsZvec"),
            exclude: Some(AD_MARKERS),
        },
        ResultStrategy {
            container: "div.MjjYud",
            link: "a[href]",
            title: "h3",
            snippet: Some("div.VwiC3b, div[data-sncf], div.ITZIwc"),
            exclude: Some(AD_MARKERS),
        },
        ResultStrategy {
            container: "div.tF2Cxc",
            link: "a[href]",
            title: "h3",
            snippet: Some("div.VwiC3b, div.IsZvec"),
            exclude: Some(AD_MARKERS),
        },
        // Basic HTML layout served to clients without JavaScript.
        ResultStrategy {
            container: "div.ZINbbc",
            link: "a[href^='/url?']",
            title: "h3, div.vvjwJb",
            snippet: Some("div.s3v9rd, div.BNeawe.s3v9rd"),
            exclude: Some(AD_MARKERS),
        },
    ],
    ads: &[
        ResultStrategy {
            container: "div[data-text-ad]",
            link: "a[href]",
            title: "div[role=heading], span[role=heading], h3",
            snippet: None,
            exclude: None,
        },
        ResultStrategy {
            container: "#tads div.uEierd, #tadsb div.uEierd",
            link: "a[href]",
            title: "div[role=heading], h3",
            snippet: None,
            exclude: None,
        },
        ResultStrategy {
            container: "#tads li.ads-ad",
            link: "a[href]",
            title: "h3",
            snippet: None,
            exclude: None,
        },
    ],
};

#[cfg(test)]
mod tests {
    use harvest_common::AdPlacement;

    use crate::document::canonicalize;
    use crate::serp::{SerpLimits, SerpParser};

    use super::*;

    const PAGE: &str = r#"<html><body>
    <div id="tads">
      <div data-text-ad="1">
        <a href="https://www.ads.example/landing"><div role="heading">Лучшие окна дешево</div></a>
      </div>
    </div>
    <div id="search">
      <div class="g">
        <a href="https://www.first.example/one"><h3>First result</h3></a>
        <div class="VwiC3b">First <em>snippet</em> text</div>
      </div>
      <div class="g">
        <a href="/url?q=https://second.example/two&amp;sa=U"><h3>Second result</h3></a>
      </div>
      <div class="g">
        <a href="https://www.first.example/one"><h3>Duplicate</h3></a>
      </div>
      <div class="g"><h3>No link at all</h3></div>
    </div>
    </body></html>"#;

    fn parser(limits: SerpLimits) -> SerpParser {
        SerpParser::new(SearchEngine::Google, limits)
    }

    #[test]
    fn organic_results_are_positioned_after_filtering() {
        let page = parser(SerpLimits::default()).parse(&canonicalize(PAGE), 1);
        assert_eq!(page.organic.len(), 2);

        let first = &page.organic[0];
        assert_eq!(first.position, 1);
        assert_eq!(first.url, "https://www.first.example/one");
        assert_eq!(first.domain, "first.example");
        assert_eq!(first.title, "First result");
        assert_eq!(first.snippet.as_deref(), Some("First snippet text"));
        assert!(!first.truncated);

        let second = &page.organic[1];
        assert_eq!(second.position, 2);
        assert_eq!(second.url, "https://second.example/two");
        assert!(second.snippet.is_none());
    }

    #[test]
    fn ads_are_tagged_top() {
        let page = parser(SerpLimits::default()).parse(&canonicalize(PAGE), 1);
        assert_eq!(page.ads.len(), 1);
        let ad = &page.ads[0];
        assert_eq!(ad.position, 1);
        assert_eq!(ad.placement, AdPlacement::Top);
        assert_eq!(ad.domain, "ads.example");
        assert_eq!(ad.title, "Лучшие окна дешево");
    }

    #[test]
    fn title_and_snippet_truncate_independently() {
        let limits = SerpLimits {
            max_title_chars: 5,
            max_snippet_chars: 100,
        };
        let page = parser(limits).parse(&canonicalize(PAGE), 1);
        let first = &page.organic[0];
        assert_eq!(first.title, "First");
        assert_eq!(first.snippet.as_deref(), Some("First snippet text"));
        assert!(first.truncated);

        let limits = SerpLimits {
            max_title_chars: 100,
            max_snippet_chars: 5,
        };
        let page = parser(limits).parse(&canonicalize(PAGE), 1);
        assert_eq!(page.organic[0].title, "First result");
        assert_eq!(page.organic[0].snippet.as_deref(), Some("First"));
        assert!(page.organic[0].truncated);
        assert!(!page.organic[1].truncated);
    }
}
