// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::dom::{absolutize, element_text, parse_date, parse_employee_count, strip_scheme};
use super::specialized::PropertyListingExtractor;
use super::{ExtractionError, ExtractionStrategy};
use crate::domain::models::lead::{LeadCandidate, ScrapedData};
use crate::domain::models::selector_config::ConfigurationError;
use crate::domain::models::source::ScrapingSource;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

/// 按抓取源自身选择器配置提取
///
/// 用于所有未被专用提取器识别的抓取源。容器选择器与公司名选择器必填，
/// 其余字段选择器均相对于容器求值。
pub struct ConfiguredExtractor;

impl ExtractionStrategy for ConfiguredExtractor {
    fn tier(&self) -> &'static str {
        "configured"
    }

    fn applies_to(&self, source: &ScrapingSource) -> bool {
        !PropertyListingExtractor::recognizes(source)
    }

    fn extract(
        &self,
        document: &Html,
        source: &ScrapingSource,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScrapedData>, ExtractionError> {
        let config = source.selector_config()?;
        let container = parse(&config.container_selector, "containerSelector")?;
        let fields = &config.field_selectors;
        let company_name = parse(&fields.company_name, "companyName")?;

        let optional: Vec<(&'static str, Selector)> = fields
            .optional_fields()
            .into_iter()
            .map(|(field, sel)| parse(sel, field).map(|s| (field, s)))
            .collect::<Result<_, _>>()?;

        let leads = document
            .select(&container)
            .filter_map(|card| {
                let mut candidate = LeadCandidate {
                    company_name: card.select(&company_name).next().map(element_text),
                    ..Default::default()
                };
                for (field, selector) in &optional {
                    if let Some(element) = card.select(selector).next() {
                        assign(&mut candidate, field, element, &source.url);
                    }
                }
                candidate.finish(now)
            })
            .collect();

        Ok(leads)
    }
}

fn parse(selector: &str, field: &str) -> Result<Selector, ConfigurationError> {
    Selector::parse(selector).map_err(|_| ConfigurationError::InvalidSelector {
        field: field.to_string(),
        selector: selector.to_string(),
    })
}

fn assign(candidate: &mut LeadCandidate, field: &str, element: ElementRef<'_>, base_url: &str) {
    let text = element_text(element);
    let attr = |name: &str| element.value().attr(name).map(str::to_string);

    match field {
        "industry" => candidate.industry = Some(text),
        "address" => candidate.address = Some(text),
        "city" => candidate.city = Some(text),
        "state" => candidate.state = Some(text),
        "zipCode" => candidate.zip_code = Some(text),
        "contactName" => candidate.contact_name = Some(text),
        "contactTitle" => candidate.contact_title = Some(text),
        "contactEmail" => {
            candidate.contact_email = non_empty(text).or_else(|| attr("href").map(|h| strip_scheme(&h)))
        }
        "contactPhone" => {
            candidate.contact_phone = non_empty(text).or_else(|| attr("href").map(|h| strip_scheme(&h)))
        }
        "website" => {
            candidate.website = attr("href")
                .and_then(|h| absolutize(base_url, &h))
                .or(non_empty(text))
        }
        "moveDate" => {
            candidate.move_date = parse_date(&text).or_else(|| attr("datetime").and_then(|d| parse_date(&d)))
        }
        "employeeCount" => candidate.employee_count = parse_employee_count(&text),
        "officeSize" => candidate.office_size = Some(text),
        _ => {}
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
