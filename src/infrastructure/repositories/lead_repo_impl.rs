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

use crate::domain::models::lead::{Lead, NewLead, ScrapedData};
use crate::domain::repositories::lead_repository::LeadRepository;
use crate::infrastructure::database::entities::lead as lead_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

/// 线索仓库实现
#[derive(Clone)]
pub struct LeadRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl LeadRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<lead_entity::Model> for Lead {
    fn from(model: lead_entity::Model) -> Self {
        let created_at = model.created_at.with_timezone(&Utc);
        Self {
            id: model.id,
            data: ScrapedData {
                company_name: model.company_name,
                industry: model.industry,
                address: model.address,
                city: model.city,
                state: model.state,
                zip_code: model.zip_code,
                contact_name: model.contact_name,
                contact_title: model.contact_title,
                contact_email: model.contact_email,
                contact_phone: model.contact_phone,
                website: model.website,
                move_date: model
                    .move_date
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or(created_at),
                employee_count: model.employee_count,
                office_size: model.office_size,
            },
            email_status: model.email_status.parse().unwrap_or_default(),
            scraped_from: model.scraped_from,
            created_at,
        }
    }
}

impl From<&NewLead> for lead_entity::ActiveModel {
    fn from(lead: &NewLead) -> Self {
        let data = &lead.data;
        Self {
            company_name: Set(data.company_name.clone()),
            industry: Set(data.industry.clone()),
            address: Set(data.address.clone()),
            city: Set(data.city.clone()),
            state: Set(data.state.clone()),
            zip_code: Set(data.zip_code.clone()),
            contact_name: Set(data.contact_name.clone()),
            contact_title: Set(data.contact_title.clone()),
            contact_email: Set(data.contact_email.clone()),
            contact_phone: Set(data.contact_phone.clone()),
            website: Set(data.website.clone()),
            move_date: Set(Some(data.move_date.into())),
            employee_count: Set(data.employee_count),
            office_size: Set(data.office_size.clone()),
            email_status: Set(lead.email_status.to_string()),
            scraped_from: Set(lead.scraped_from.clone()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl LeadRepository for LeadRepositoryImpl {
    async fn create(&self, lead: &NewLead) -> Result<Lead, RepositoryError> {
        let model: lead_entity::ActiveModel = lead.into();
        let model = model.insert(self.db.as_ref()).await?;
        Ok(model.into())
    }

    async fn find_by_source_url(&self, url: &str) -> Result<Vec<Lead>, RepositoryError> {
        let models = lead_entity::Entity::find()
            .filter(lead_entity::Column::ScrapedFrom.eq(url))
            .order_by_asc(lead_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
