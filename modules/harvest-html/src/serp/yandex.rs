use harvest_common::SearchEngine;

use super::strategy::{EngineMarkup, ResultStrategy};

const AD_MARKERS: &str = "[data-fast-name=direct], .advertising, .label_theme_direct, .Organic-Label_type_advertisement";

pub(super) const MARKUP: EngineMarkup = EngineMarkup {
    engine: SearchEngine::Yandex,
    base_url: "https://yandex.ru/",
    organic: &[
        ResultStrategy {
            container: "li.serp-item",
            link: "h2 a[href], a.Link[href], a.OrganicTitle-Link[href]",
            title: "h2, .OrganicTitle-LinkText",
            snippet: Some(".text-container, .OrganicText, .Organic-ContentWrapper"),
            exclude: Some(AD_MARKERS),
        },
        ResultStrategy {
            container: "li[data-cid]",
            link: "a.OrganicTitle-Link[href], a[href]",
            title: ".OrganicTitle-LinkText, h2",
            snippet: Some(".OrganicText, .text-container"),
            exclude: Some(AD_MARKERS),
        },
        ResultStrategy {
            container: ".serp-list .organic",
            link: "a[href]",
            title: "h2, .organic__title",
            snippet: Some(".text-container, .organic__text"),
            exclude: Some(AD_MARKERS),
        },
    ],
    ads: &[
        ResultStrategy {
            container: "li.serp-item[data-fast-name=direct]",
            link: "h2 a[href], a[href]",
            title: "h2, .OrganicTitle-LinkText",
            snippet: None,
            exclude: None,
        },
        ResultStrategy {
            container: ".serp-adv__item",
            link: "a[href]",
            title: "h2, .organic__title, a",
            snippet: None,
            exclude: None,
        },
    ],
};
