// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

static REGION_POSTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<prefix>.*?)\s*\b(?P<region>[A-Z]{2,3})\s+(?P<postcode>\d{4,5})$").unwrap()
});

/// 地址拆分结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub street: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
}

/// 拆分地址字符串
///
/// 按逗号切分；最后一段匹配 "地区代码 + 邮编"，倒数第二段为所在地。
/// 最后一段在地区代码前还有文字时，该文字即所在地。
///
/// `"200 Main St, Springfield, NSW 2000"` → street `200 Main St`,
/// locality `Springfield`, region `NSW`, postcode `2000`。
pub fn decompose(address: &str) -> AddressParts {
    let segments: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let Some((last, rest)) = segments.split_last() else {
        return AddressParts::default();
    };

    let mut parts = AddressParts::default();
    let captures = REGION_POSTCODE.captures(last);

    match captures {
        Some(caps) => {
            parts.region = caps.name("region").map(|m| m.as_str().to_string());
            parts.postcode = caps.name("postcode").map(|m| m.as_str().to_string());
            let prefix = caps.name("prefix").map(|m| m.as_str().trim()).unwrap_or("");

            if !prefix.is_empty() {
                parts.locality = Some(prefix.to_string());
                parts.street = join(rest);
            } else if let Some((locality, street)) = rest.split_last() {
                parts.locality = Some(locality.to_string());
                parts.street = join(street);
            }
        }
        None if !rest.is_empty() => {
            parts.locality = Some(last.to_string());
            parts.street = join(rest);
        }
        None => {
            parts.street = Some(last.to_string());
        }
    }

    parts
}

fn join(segments: &[&str]) -> Option<String> {
    if segments.is_empty() {
        None
    } else {
        Some(segments.join(", "))
    }
}
