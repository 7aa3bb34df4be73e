// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::job::{JobStatus, JobUpdate, ScrapingJob};
use crate::domain::repositories::job_repository::JobRepository;
use crate::infrastructure::database::entities::scraping_job as job_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

/// 作业仓库实现
///
/// 基于SeaORM实现的作业数据访问层
#[derive(Clone)]
pub struct JobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl JobRepositoryImpl {
    /// 创建新的作业仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的作业仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<job_entity::Model> for ScrapingJob {
    fn from(model: job_entity::Model) -> Self {
        Self {
            id: model.id,
            source_id: model.source_id,
            status: model.status.parse().unwrap_or_default(),
            start_time: model.start_time.with_timezone(&Utc),
            end_time: model.end_time.map(|t| t.with_timezone(&Utc)),
            leads_found: model.leads_found,
            leads_added: model.leads_added,
            error: model.error,
        }
    }
}

fn offset(time: DateTime<Utc>) -> DateTime<FixedOffset> {
    time.into()
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, source_id: i32) -> Result<ScrapingJob, RepositoryError> {
        let model = job_entity::ActiveModel {
            source_id: Set(source_id),
            status: Set(JobStatus::Running.to_string()),
            start_time: Set(offset(Utc::now())),
            ..Default::default()
        };

        let model = model.insert(self.db.as_ref()).await?;
        Ok(model.into())
    }

    async fn update(
        &self,
        id: i32,
        update: &JobUpdate,
    ) -> Result<Option<ScrapingJob>, RepositoryError> {
        let txn = self.db.begin().await?;

        // Row lock keeps concurrent finalize/cancel writes ordered
        let Some(model) = job_entity::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            return Ok(None);
        };

        let mut job: ScrapingJob = model.clone().into();
        job.apply(update)?;

        let mut active: job_entity::ActiveModel = model.into();
        active.status = Set(job.status.to_string());
        active.end_time = Set(job.end_time.map(offset));
        active.leads_found = Set(job.leads_found);
        active.leads_added = Set(job.leads_added);
        active.error = Set(job.error.clone());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(Some(updated.into()))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ScrapingJob>, RepositoryError> {
        let model = job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }
}
