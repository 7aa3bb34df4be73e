// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source::{NewSource, ScrapingSource, SourceUpdate};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 抓取源仓库特质
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// 创建抓取源
    async fn create(&self, source: &NewSource) -> Result<ScrapingSource, RepositoryError>;
    /// 根据ID查找抓取源
    async fn find_by_id(&self, id: i32) -> Result<Option<ScrapingSource>, RepositoryError>;
    /// 局部更新抓取源，不存在时返回 None
    async fn update(
        &self,
        id: i32,
        update: &SourceUpdate,
    ) -> Result<Option<ScrapingSource>, RepositoryError>;
    /// 列出全部抓取源
    async fn list(&self) -> Result<Vec<ScrapingSource>, RepositoryError>;
}
