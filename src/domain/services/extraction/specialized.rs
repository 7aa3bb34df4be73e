// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::address::decompose;
use super::dom::{
    absolutize, element_text, first_text, parse_date, select_attr, selectors, strip_scheme,
};
use super::{ExtractionError, ExtractionStrategy};
use crate::domain::models::lead::{LeadCandidate, ScrapedData};
use crate::domain::models::source::ScrapingSource;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// 已知商业地产挂牌站点的域名
const KNOWN_HOSTS: &[&str] = &[
    "commercialrealestate.com.au",
    "realcommercial.com.au",
    "realestate.com.au",
];

/// 名称中出现即视为挂牌站点的关键词
const KNOWN_NAMES: &[&str] = &["commercial real estate", "realcommercial", "property listings"];

static CARDS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[data-testid='listing-card']",
        ".listing-card",
        "article.listing",
        ".property-card",
    ])
});
static TITLE: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[data-testid='listing-title']",
        ".listing-card__title",
        ".property-title",
        "h3",
    ])
});
static ADDRESS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[data-testid='address']",
        ".listing-card__address",
        ".address",
        "h2",
    ])
});
static AGENCY: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["[data-testid='agency-name']", ".agency-name", ".agency"]));
static AGENT: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["[data-testid='agent-name']", ".agent-name"]));
static PHONE_LINK: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["a[href^='tel:']"]));
static PHONE: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&[".agent-phone", ".phone"]));
static PROPERTY_TYPE: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["[data-testid='property-type']", ".property-type"]));
static FLOOR_AREA: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[data-testid='floor-area']",
        ".floor-area",
        ".property-size",
    ])
});
static LISTED: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["[data-testid='listed-date']", ".listed-date", "time"]));
static LINK: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["a[href]"]));

/// 商业地产挂牌站点提取器
///
/// 按名称或域名识别抓取源，使用针对挂牌卡片调优的选择器，并拆分地址得到
/// 所在地、地区代码与邮编。
pub struct PropertyListingExtractor;

impl PropertyListingExtractor {
    /// 抓取源是否为已知挂牌站点
    pub fn recognizes(source: &ScrapingSource) -> bool {
        let name = source.name.to_lowercase();
        if KNOWN_NAMES.iter().any(|n| name.contains(n)) {
            return true;
        }
        source.host().is_some_and(|host| {
            KNOWN_HOSTS
                .iter()
                .any(|known| host == *known || host.ends_with(&format!(".{}", known)))
        })
    }

    fn card(card: ElementRef<'_>, base_url: &str) -> LeadCandidate {
        let address = first_text(card, &ADDRESS);
        let parts = address.as_deref().map(decompose).unwrap_or_default();

        let phone = PHONE_LINK
            .iter()
            .find_map(|s| select_attr(card, s, "href"))
            .map(|h| strip_scheme(&h))
            .or_else(|| first_text(card, &PHONE));

        let listed = LISTED.iter().find_map(|s| {
            card.select(s).next().and_then(|e| {
                e.value()
                    .attr("datetime")
                    .and_then(parse_date)
                    .or_else(|| parse_date(&element_text(e)))
            })
        });

        LeadCandidate {
            company_name: first_text(card, &TITLE),
            industry: first_text(card, &PROPERTY_TYPE),
            address,
            city: parts.locality,
            state: parts.region,
            zip_code: parts.postcode,
            contact_name: first_text(card, &AGENT).or_else(|| first_text(card, &AGENCY)),
            contact_phone: phone,
            website: LINK
                .iter()
                .find_map(|s| select_attr(card, s, "href"))
                .and_then(|h| absolutize(base_url, &h)),
            move_date: listed,
            office_size: first_text(card, &FLOOR_AREA),
            ..Default::default()
        }
    }
}

impl ExtractionStrategy for PropertyListingExtractor {
    fn tier(&self) -> &'static str {
        "specialized"
    }

    fn applies_to(&self, source: &ScrapingSource) -> bool {
        Self::recognizes(source)
    }

    fn extract(
        &self,
        document: &Html,
        source: &ScrapingSource,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScrapedData>, ExtractionError> {
        // First card pattern with any match wins
        let leads = CARDS
            .iter()
            .map(|sel| document.select(sel).collect::<Vec<_>>())
            .find(|cards| !cards.is_empty())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|card| Self::card(card, &source.url).finish(now))
            .collect();

        Ok(leads)
    }
}
