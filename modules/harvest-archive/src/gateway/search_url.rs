use harvest_common::SearchEngine;
use url::form_urlencoded;

const GOOGLE_SEARCH: &str = "https://www.google.com/search";
const YANDEX_SEARCH: &str = "https://yandex.ru/search/";

/// Per-request knobs that shape a search URL.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams<'a> {
    pub results_per_page: u32,
    /// BCP 47 style, e.g. `ru-RU`; Google gets the language part as `hl`.
    pub locale: &'a str,
    /// Google `gl`.
    pub geo: &'a str,
    /// Yandex `lr`.
    pub region: &'a str,
}

/// Result page URL for a 1-based page number.
pub fn search_url(engine: SearchEngine, query: &str, page: u32, params: &SearchParams<'_>) -> String {
    let offset = page.saturating_sub(1);
    let mut query_string = form_urlencoded::Serializer::new(String::new());

    match engine {
        SearchEngine::Google => {
            query_string
                .append_pair("q", query)
                .append_pair("hl", language(params.locale))
                .append_pair("gl", params.geo)
                .append_pair("num", &params.results_per_page.to_string())
                .append_pair("start", &(offset * params.results_per_page).to_string());
            format!("{GOOGLE_SEARCH}?{}", query_string.finish())
        }
        SearchEngine::Yandex => {
            query_string
                .append_pair("text", query)
                .append_pair("p", &offset.to_string())
                .append_pair("lr", params.region)
                .append_pair("numdoc", &params.results_per_page.to_string());
            format!("{YANDEX_SEARCH}?{}", query_string.finish())
        }
    }
}

fn language(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: SearchParams<'static> = SearchParams {
        results_per_page: 10,
        locale: "ru-RU",
        geo: "ru",
        region: "213",
    };

    #[test]
    fn google_pages_offset_by_results_per_page() {
        assert_eq!(
            search_url(SearchEngine::Google, "пластиковые окна", 1, &PARAMS),
            "https://www.google.com/search?q=%D0%BF%D0%BB%D0%B0%D1%81%D1%82%D0%B8%D0%BA%D0%BE%D0%B2%D1%8B%D0%B5+%D0%BE%D0%BA%D0%BD%D0%B0&hl=ru&gl=ru&num=10&start=0"
        );
        let third = search_url(SearchEngine::Google, "rust", 3, &PARAMS);
        assert!(third.ends_with("q=rust&hl=ru&gl=ru&num=10&start=20"));
    }

    #[test]
    fn yandex_pages_are_zero_based() {
        let url = search_url(SearchEngine::Yandex, "rust lang", 2, &PARAMS);
        assert_eq!(url, "https://yandex.ru/search/?text=rust+lang&p=1&lr=213&numdoc=10");
    }

    #[test]
    fn language_is_taken_from_locale() {
        assert_eq!(language("en-US"), "en");
        assert_eq!(language("de_DE"), "de");
        assert_eq!(language("ru"), "ru");
    }
}
