// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::address::decompose;
use super::dom::{element_text, first_text, select_attr, selectors, strip_scheme};
use super::{ExtractionError, ExtractionStrategy};
use crate::domain::models::lead::{LeadCandidate, ScrapedData};
use crate::domain::models::source::ScrapingSource;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// 卡片容器模式，按优先级排列
const CONTAINER_PATTERNS: &[&str] = &[
    ".listing-card",
    ".property-card",
    ".card",
    "article",
    ".result-item",
    ".search-result",
    "li.result",
    ".item",
];

static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| selectors(CONTAINER_PATTERNS));
static TITLE: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&["h1", "h2", "h3", "h4", ".title", ".name", "[class*='title']"])
});
static ADDRESS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&["address", ".address", "[class*='address']", "[class*='location']"])
});
static PHONE_LINK: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["a[href^='tel:']"]));
static PHONE: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&[".phone", "[class*='phone']"]));
static CATEGORY: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        ".category",
        ".industry",
        "[class*='category']",
        ".type",
        ".tag",
    ])
});
static PHONE_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\(?\d[\d\s\-()]{6,}\d").unwrap());

/// 通用卡片启发式提取器
///
/// 仅在前两层没有产出时使用；按固定优先级尝试常见卡片容器，
/// 第一个有匹配的模式胜出，没有标题的卡片被跳过。
pub struct GenericExtractor;

impl GenericExtractor {
    fn card(card: ElementRef<'_>) -> Option<LeadCandidate> {
        let title = first_text(card, &TITLE)?;
        let address = first_text(card, &ADDRESS);
        let parts = address.as_deref().map(decompose).unwrap_or_default();

        Some(LeadCandidate {
            company_name: Some(title),
            industry: first_text(card, &CATEGORY),
            address,
            city: parts.locality,
            state: parts.region,
            zip_code: parts.postcode,
            contact_phone: Self::phone(card),
            ..Default::default()
        })
    }

    fn phone(card: ElementRef<'_>) -> Option<String> {
        PHONE_LINK
            .iter()
            .find_map(|s| select_attr(card, s, "href"))
            .map(|h| strip_scheme(&h))
            .or_else(|| first_text(card, &PHONE))
            .or_else(|| {
                let text = element_text(card);
                PHONE_TEXT
                    .find(&text)
                    .map(|m| m.as_str().trim().to_string())
            })
    }
}

impl ExtractionStrategy for GenericExtractor {
    fn tier(&self) -> &'static str {
        "generic"
    }

    fn extract(
        &self,
        document: &Html,
        _source: &ScrapingSource,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScrapedData>, ExtractionError> {
        let Some(cards) = CONTAINERS
            .iter()
            .map(|sel| document.select(sel).collect::<Vec<_>>())
            .find(|cards| !cards.is_empty())
        else {
            return Ok(Vec::new());
        };

        Ok(cards
            .into_iter()
            .filter_map(Self::card)
            .filter_map(|candidate| candidate.finish(now))
            .collect())
    }
}
