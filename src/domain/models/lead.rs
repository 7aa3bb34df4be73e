// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 邮箱校验状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    /// 等待校验（存在联系人邮箱）
    #[default]
    Pending,
    /// 已校验通过
    Verified,
    /// 无可用邮箱或校验失败
    Failed,
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmailStatus::Pending => write!(f, "pending"),
            EmailStatus::Verified => write!(f, "verified"),
            EmailStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for EmailStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EmailStatus::Pending),
            "verified" => Ok(EmailStatus::Verified),
            "failed" => Ok(EmailStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 提取器产出的线索数据
///
/// `company_name` 永远非空；`move_date` 在页面上无法提取日期时取当前时间。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedData {
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
    pub website: Option<String>,
    pub move_date: DateTime<Utc>,
    pub employee_count: Option<i32>,
    pub office_size: Option<String>,
}

/// 线索候选
///
/// 提取过程中逐字段填充的中间结构，通过 [`LeadCandidate::finish`]
/// 转换为 [`ScrapedData`]。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadCandidate {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub contact_name: Option<String>,
    pub contact_title: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub move_date: Option<DateTime<Utc>>,
    pub employee_count: Option<i32>,
    pub office_size: Option<String>,
}

impl LeadCandidate {
    /// 完成候选记录
    ///
    /// 没有明确公司名但已知所在地时合成 `"Property in {locality}"`；
    /// 两者都缺失时丢弃该记录。
    pub fn finish(self, now: DateTime<Utc>) -> Option<ScrapedData> {
        let company_name = non_empty(self.company_name).or_else(|| {
            non_empty(self.city.clone()).map(|city| format!("Property in {}", city))
        })?;

        Some(ScrapedData {
            company_name,
            industry: non_empty(self.industry),
            address: non_empty(self.address),
            city: non_empty(self.city),
            state: non_empty(self.state),
            zip_code: non_empty(self.zip_code),
            contact_name: non_empty(self.contact_name),
            contact_title: non_empty(self.contact_title),
            contact_email: non_empty(self.contact_email),
            contact_phone: non_empty(self.contact_phone),
            website: non_empty(self.website),
            move_date: self.move_date.unwrap_or(now),
            employee_count: self.employee_count,
            office_size: non_empty(self.office_size),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 待入库的线索
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLead {
    #[serde(flatten)]
    pub data: ScrapedData,
    pub email_status: EmailStatus,
    pub scraped_from: String,
}

impl NewLead {
    /// 由提取结果派生入库数据
    ///
    /// 存在联系人邮箱时 `email_status` 为 `Pending`，否则为 `Failed`。
    pub fn from_scraped(data: ScrapedData, scraped_from: &str) -> Self {
        let email_status = if data.contact_email.is_some() {
            EmailStatus::Pending
        } else {
            EmailStatus::Failed
        };

        Self {
            data,
            email_status,
            scraped_from: scraped_from.to_string(),
        }
    }
}

/// 已入库的线索
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i32,
    #[serde(flatten)]
    pub data: ScrapedData,
    pub email_status: EmailStatus,
    pub scraped_from: String,
    pub created_at: DateTime<Utc>,
}
