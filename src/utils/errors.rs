// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::DomainError;
use crate::domain::models::selector_config::ConfigurationError;
use crate::engines::traits::FetchError;
use sea_orm::DbErr;
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 违反领域规则的更新
    #[error("Rejected update: {0}")]
    Domain(#[from] DomainError),
}

/// 抓取作业错误类型
///
/// 作业级错误会以 `failed` 状态与错误信息写入作业记录。
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// 同一抓取源已有活跃作业
    #[error("A scraping job is already running for source {source_id}")]
    Concurrency { source_id: i32 },

    /// 抓取源已停用
    #[error("Source {0} is disabled")]
    SourceDisabled(i32),

    /// 抓取源不存在
    #[error("Source {0} not found")]
    SourceNotFound(i32),

    /// 选择器配置错误
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// 页面获取失败
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// 所有提取层均未产出记录
    #[error("No leads extracted: {0}")]
    ExtractionEmpty(String),

    /// 持久化失败
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),

    /// 暂停超过允许的最长时间
    #[error("paused longer than {0}s")]
    PauseExpired(u64),
}

impl ScrapeError {
    /// HTTP 状态码（若错误来自获取阶段）
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ScrapeError::Fetch(e) => e.status(),
            _ => None,
        }
    }
}
