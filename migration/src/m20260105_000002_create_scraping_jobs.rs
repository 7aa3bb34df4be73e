use sea_orm_migration::prelude::*;

use super::m20260105_000001_create_scraping_sources::ScrapingSources;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create scraping_jobs table
        manager
            .create_table(
                Table::create()
                    .table(ScrapingJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScrapingJobs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScrapingJobs::SourceId).integer().not_null())
                    .col(ColumnDef::new(ScrapingJobs::Status).string().not_null())
                    .col(
                        ColumnDef::new(ScrapingJobs::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScrapingJobs::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(ScrapingJobs::LeadsFound).integer())
                    .col(ColumnDef::new(ScrapingJobs::LeadsAdded).integer())
                    .col(ColumnDef::new(ScrapingJobs::Error).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scraping_jobs_source_id")
                            .from(ScrapingJobs::Table, ScrapingJobs::SourceId)
                            .to(ScrapingSources::Table, ScrapingSources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scraping_jobs_source_status")
                    .table(ScrapingJobs::Table)
                    .col(ScrapingJobs::SourceId)
                    .col(ScrapingJobs::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScrapingJobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScrapingJobs {
    Table,
    Id,
    SourceId,
    Status,
    StartTime,
    EndTime,
    LeadsFound,
    LeadsAdded,
    Error,
}
