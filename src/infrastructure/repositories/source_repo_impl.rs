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

use crate::domain::models::source::{NewSource, ScrapingSource, SourceUpdate};
use crate::domain::repositories::source_repository::SourceRepository;
use crate::infrastructure::database::entities::scraping_source as source_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use std::sync::Arc;

/// 抓取源仓库实现
#[derive(Clone)]
pub struct SourceRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl SourceRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<source_entity::Model> for ScrapingSource {
    fn from(model: source_entity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            url: model.url,
            selectors: model.selectors,
            auth_credential: model.auth_credential,
            enabled: model.enabled,
            last_scraped: model.last_scraped.map(|t| t.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[async_trait]
impl SourceRepository for SourceRepositoryImpl {
    async fn create(&self, source: &NewSource) -> Result<ScrapingSource, RepositoryError> {
        let model = source_entity::ActiveModel {
            name: Set(source.name.clone()),
            url: Set(source.url.clone()),
            selectors: Set(source.selectors.clone()),
            auth_credential: Set(source.auth_credential.clone()),
            enabled: Set(source.enabled),
            last_scraped: Set(None),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = model.insert(self.db.as_ref()).await?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ScrapingSource>, RepositoryError> {
        let model = source_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(
        &self,
        id: i32,
        update: &SourceUpdate,
    ) -> Result<Option<ScrapingSource>, RepositoryError> {
        let Some(model) = source_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let mut source: ScrapingSource = model.clone().into();
        source.apply(update);

        let mut active: source_entity::ActiveModel = model.into();
        active.name = Set(source.name);
        active.url = Set(source.url);
        active.selectors = Set(source.selectors);
        active.enabled = Set(source.enabled);
        active.last_scraped = Set(source.last_scraped.map(Into::into));

        let updated = active.update(self.db.as_ref()).await?;
        Ok(Some(updated.into()))
    }

    async fn list(&self) -> Result<Vec<ScrapingSource>, RepositoryError> {
        let models = source_entity::Entity::find()
            .order_by_asc(source_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
