// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::lead::{Lead, NewLead};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 线索仓库特质
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// 保存一条线索
    async fn create(&self, lead: &NewLead) -> Result<Lead, RepositoryError>;
    /// 按来源URL查找线索，按创建顺序返回
    async fn find_by_source_url(&self, url: &str) -> Result<Vec<Lead>, RepositoryError>;
}
