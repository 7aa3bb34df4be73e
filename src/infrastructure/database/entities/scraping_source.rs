// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scraping_sources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub url: String,
    pub selectors: Json,
    pub auth_credential: Option<String>,
    pub enabled: bool,
    pub last_scraped: Option<ChronoDateTimeWithTimeZone>,
    pub created_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::scraping_job::Entity")]
    ScrapingJob,
}

impl Related<super::scraping_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScrapingJob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
