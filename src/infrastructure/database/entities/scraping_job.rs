// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scraping_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub source_id: i32,
    pub status: String,
    pub start_time: ChronoDateTimeWithTimeZone,
    pub end_time: Option<ChronoDateTimeWithTimeZone>,
    pub leads_found: Option<i32>,
    pub leads_added: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scraping_source::Entity",
        from = "Column::SourceId",
        to = "super::scraping_source::Column::Id",
        on_delete = "Cascade"
    )]
    ScrapingSource,
}

impl Related<super::scraping_source::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScrapingSource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
