// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::Selector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use validator::Validate;

/// 选择器配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// 配置无法解析为预期结构
    #[error("Malformed selector configuration: {0}")]
    Malformed(String),

    /// 缺少必填字段
    #[error("Missing required selector: {0}")]
    MissingField(String),

    /// 选择器语法错误
    #[error("Invalid selector for {field}: {selector}")]
    InvalidSelector { field: String, selector: String },
}

/// 抓取源的选择器配置
///
/// 对应外部输入：
/// `{ containerSelector, fieldSelectors: { companyName, industry?, ... } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SelectorConfig {
    /// 单条记录根元素的选择器
    #[serde(default)]
    #[validate(length(min = 1, message = "containerSelector"))]
    pub container_selector: String,
    /// 字段选择器
    #[serde(default)]
    #[validate(nested)]
    pub field_selectors: FieldSelectors,
}

/// 字段选择器，均相对于容器元素求值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FieldSelectors {
    #[serde(default)]
    #[validate(length(min = 1, message = "fieldSelectors.companyName"))]
    pub company_name: String,
    pub industry: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub contact_name: Option<String>,
    pub contact_title: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub move_date: Option<String>,
    pub website: Option<String>,
    pub employee_count: Option<String>,
    pub office_size: Option<String>,
}

impl FieldSelectors {
    /// 以 (字段名, 选择器) 形式列出所有已配置的可选字段
    pub fn optional_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("industry", &self.industry),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
            ("contactName", &self.contact_name),
            ("contactTitle", &self.contact_title),
            ("contactEmail", &self.contact_email),
            ("contactPhone", &self.contact_phone),
            ("moveDate", &self.move_date),
            ("website", &self.website),
            ("employeeCount", &self.employee_count),
            ("officeSize", &self.office_size),
        ]
        .into_iter()
        .filter_map(|(name, sel)| {
            sel.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| (name, s))
        })
        .collect()
    }
}

impl SelectorConfig {
    /// 从抓取源存储的 JSON 中解析并校验选择器配置
    ///
    /// # 返回值
    ///
    /// * `Ok(SelectorConfig)` - 结构合法且必填字段齐全
    /// * `Err(ConfigurationError)` - 结构错误、缺少必填字段或选择器语法错误
    pub fn from_value(value: &Value) -> Result<Self, ConfigurationError> {
        if value.is_null() {
            return Err(ConfigurationError::MissingField(
                "containerSelector".to_string(),
            ));
        }

        let config: SelectorConfig = serde_json::from_value(value.clone())
            .map_err(|e| ConfigurationError::Malformed(e.to_string()))?;
        config.validate_selectors()?;
        Ok(config)
    }

    /// 校验必填字段以及每个选择器的语法
    pub fn validate_selectors(&self) -> Result<(), ConfigurationError> {
        if self.validate().is_err() {
            let field = if self.container_selector.is_empty() {
                "containerSelector"
            } else {
                "fieldSelectors.companyName"
            };
            return Err(ConfigurationError::MissingField(field.to_string()));
        }

        let required = [
            ("containerSelector", self.container_selector.as_str()),
            ("companyName", self.field_selectors.company_name.as_str()),
        ];
        for (field, selector) in required
            .into_iter()
            .chain(self.field_selectors.optional_fields())
        {
            if selector.trim().is_empty() {
                return Err(ConfigurationError::MissingField(field.to_string()));
            }
            if Selector::parse(selector).is_err() {
                return Err(ConfigurationError::InvalidSelector {
                    field: field.to_string(),
                    selector: selector.to_string(),
                });
            }
        }

        Ok(())
    }
}
