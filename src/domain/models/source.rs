// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use validator::Validate;

use super::selector_config::{ConfigurationError, SelectorConfig};

/// 抓取源实体
///
/// 一个待抓取的网站及其提取规则。核心逻辑只会在一次成功运行后
/// 更新 `last_scraped`，从不删除抓取源。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapingSource {
    /// 抓取源ID
    pub id: i32,
    /// 名称
    pub name: String,
    /// 目标URL
    pub url: String,
    /// 原始选择器配置（JSON），在配置层提取时校验
    pub selectors: Value,
    /// 认证凭据占位，不对外序列化
    #[serde(skip_serializing, default)]
    pub auth_credential: Option<String>,
    /// 是否启用
    pub enabled: bool,
    /// 上次抓取时间
    pub last_scraped: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl ScrapingSource {
    /// 解析并校验选择器配置
    pub fn selector_config(&self) -> Result<SelectorConfig, ConfigurationError> {
        SelectorConfig::from_value(&self.selectors)
    }

    /// 目标URL的主机名（小写），URL无法解析时返回 None
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    }
}

/// 新建抓取源所需数据
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSource {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    #[serde(default)]
    pub selectors: Value,
    pub auth_credential: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl NewSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, selectors: Value) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            selectors,
            auth_credential: None,
            enabled: true,
        }
    }
}

/// 抓取源局部更新
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceUpdate {
    pub name: Option<String>,
    pub url: Option<String>,
    pub selectors: Option<Value>,
    pub enabled: Option<bool>,
    pub last_scraped: Option<DateTime<Utc>>,
}

impl SourceUpdate {
    /// 仅更新上次抓取时间
    pub fn last_scraped(at: DateTime<Utc>) -> Self {
        Self {
            last_scraped: Some(at),
            ..Default::default()
        }
    }
}

impl ScrapingSource {
    /// 应用局部更新
    pub fn apply(&mut self, update: &SourceUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(url) = &update.url {
            self.url = url.clone();
        }
        if let Some(selectors) = &update.selectors {
            self.selectors = selectors.clone();
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(at) = update.last_scraped {
            self.last_scraped = Some(at);
        }
    }
}
