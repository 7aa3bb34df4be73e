// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

/// 接受的日期格式，按顺序尝试
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d %B %Y", "%B %d, %Y", "%d %b %Y"];

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d,]*").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 解析一组选择器，跳过无法解析的项
pub fn selectors(patterns: &[&str]) -> Vec<Selector> {
    patterns
        .iter()
        .filter_map(|p| Selector::parse(p).ok())
        .collect()
}

/// 元素的可见文本，合并空白
pub fn element_text(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}

/// 第一个匹配元素的非空文本
pub fn select_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .map(element_text)
        .find(|t| !t.is_empty())
}

/// 依优先级尝试多个选择器，返回第一个非空文本
pub fn first_text(element: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|s| select_text(element, s))
}

/// 第一个匹配元素的属性值
pub fn select_attr(element: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .filter_map(|e| e.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// 将链接解析为绝对URL
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    if let Ok(url) = Url::parse(href) {
        return Some(url.to_string());
    }
    Url::parse(base)
        .and_then(|b| b.join(href))
        .ok()
        .map(|u| u.to_string())
}

/// 解析页面上的日期文本
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// 从自由文本中解析员工人数，例如 "1,200 staff"
pub fn parse_employee_count(text: &str) -> Option<i32> {
    INTEGER
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

/// 去掉 `mailto:` / `tel:` 前缀及查询串
pub fn strip_scheme(href: &str) -> String {
    let value = href
        .strip_prefix("mailto:")
        .or_else(|| href.strip_prefix("tel:"))
        .unwrap_or(href);
    value.split('?').next().unwrap_or(value).trim().to_string()
}
