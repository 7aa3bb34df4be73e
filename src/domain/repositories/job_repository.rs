// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{JobUpdate, ScrapingJob};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 作业仓库特质
///
/// 定义抓取作业数据访问接口
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 为抓取源创建一条运行中的作业记录
    async fn create(&self, source_id: i32) -> Result<ScrapingJob, RepositoryError>;

    /// 局部更新作业
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(job))` - 更新后的作业
    /// * `Ok(None)` - 作业不存在
    /// * `Err(RepositoryError::Domain)` - 更新违反状态机（例如修改终态作业）
    async fn update(
        &self,
        id: i32,
        update: &JobUpdate,
    ) -> Result<Option<ScrapingJob>, RepositoryError>;

    /// 根据ID查找作业
    async fn find_by_id(&self, id: i32) -> Result<Option<ScrapingJob>, RepositoryError>;
}
