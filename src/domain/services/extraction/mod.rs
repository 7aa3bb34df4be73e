// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 线索提取
//!
//! 提取按固定顺序的策略链执行：专用站点 → 抓取源选择器配置 → 通用卡片启发式，
//! 第一个产出非空结果的策略胜出。

pub mod address;
pub mod configured;
pub mod dom;
pub mod generic;
pub mod specialized;

use crate::domain::models::lead::ScrapedData;
use crate::domain::models::selector_config::ConfigurationError;
use crate::domain::models::source::ScrapingSource;
use chrono::{DateTime, Utc};
use scraper::Html;
use thiserror::Error;
use tracing::debug;

pub use configured::ConfiguredExtractor;
pub use generic::GenericExtractor;
pub use specialized::PropertyListingExtractor;

/// 提取错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// 抓取源的选择器配置无效
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// 所有策略都没有产出记录
    #[error("no records found (tried: {})", .attempts.join(", "))]
    Empty { attempts: Vec<String> },
}

/// 提取策略
///
/// 每个策略都是 (已解析页面, 抓取源) → 候选线索 的纯函数。
pub trait ExtractionStrategy: Send + Sync {
    /// 策略名称，用于日志与指标
    fn tier(&self) -> &'static str;

    /// 该策略是否适用于此抓取源
    fn applies_to(&self, _source: &ScrapingSource) -> bool {
        true
    }

    /// 从页面提取线索
    fn extract(
        &self,
        document: &Html,
        source: &ScrapingSource,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScrapedData>, ExtractionError>;
}

/// 提取结果
#[derive(Debug, Clone)]
pub struct Extraction {
    /// 产出结果的策略
    pub tier: &'static str,
    /// 按页面顺序排列的线索
    pub leads: Vec<ScrapedData>,
}

/// 有序提取策略链
pub struct ExtractionPipeline {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl ExtractionPipeline {
    /// 标准三层策略链
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(PropertyListingExtractor),
            Box::new(ConfiguredExtractor),
            Box::new(GenericExtractor),
        ])
    }

    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// 对页面运行策略链
    ///
    /// # 参数
    ///
    /// * `html` - 页面内容
    /// * `source` - 抓取源
    /// * `now` - 缺少日期时使用的默认时间
    ///
    /// # 返回值
    ///
    /// * `Ok(Extraction)` - 第一个非空结果
    /// * `Err(ExtractionError::Configuration)` - 配置无效且后续策略也没有结果
    /// * `Err(ExtractionError::Empty)` - 所有策略均无结果
    pub fn run(
        &self,
        html: &str,
        source: &ScrapingSource,
        now: DateTime<Utc>,
    ) -> Result<Extraction, ExtractionError> {
        let document = Html::parse_document(html);
        let mut attempts = Vec::new();
        let mut configuration_error = None;

        for strategy in &self.strategies {
            if !strategy.applies_to(source) {
                continue;
            }
            match strategy.extract(&document, source, now) {
                Ok(leads) if !leads.is_empty() => {
                    debug!(tier = strategy.tier(), count = leads.len(), "Extraction succeeded");
                    return Ok(Extraction {
                        tier: strategy.tier(),
                        leads,
                    });
                }
                Ok(_) => attempts.push(format!("{}: empty", strategy.tier())),
                Err(ExtractionError::Configuration(e)) => {
                    debug!(tier = strategy.tier(), error = %e, "Invalid selector configuration");
                    attempts.push(format!("{}: {}", strategy.tier(), e));
                    configuration_error.get_or_insert(e);
                }
                Err(e) => attempts.push(format!("{}: {}", strategy.tier(), e)),
            }
        }

        match configuration_error {
            Some(e) => Err(ExtractionError::Configuration(e)),
            None => Err(ExtractionError::Empty { attempts }),
        }
    }
}
