use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create leads table
        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Leads::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Leads::CompanyName).string().not_null())
                    .col(ColumnDef::new(Leads::Industry).string())
                    .col(ColumnDef::new(Leads::Address).string())
                    .col(ColumnDef::new(Leads::City).string())
                    .col(ColumnDef::new(Leads::State).string())
                    .col(ColumnDef::new(Leads::ZipCode).string())
                    .col(ColumnDef::new(Leads::ContactName).string())
                    .col(ColumnDef::new(Leads::ContactTitle).string())
                    .col(ColumnDef::new(Leads::ContactEmail).string())
                    .col(ColumnDef::new(Leads::ContactPhone).string())
                    .col(ColumnDef::new(Leads::Website).string())
                    .col(ColumnDef::new(Leads::MoveDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Leads::EmployeeCount).integer())
                    .col(ColumnDef::new(Leads::OfficeSize).string())
                    .col(ColumnDef::new(Leads::EmailStatus).string().not_null())
                    .col(ColumnDef::new(Leads::ScrapedFrom).string().not_null())
                    .col(
                        ColumnDef::new(Leads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leads_scraped_from")
                    .table(Leads::Table)
                    .col(Leads::ScrapedFrom)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Leads::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
    CompanyName,
    Industry,
    Address,
    City,
    State,
    ZipCode,
    ContactName,
    ContactTitle,
    ContactEmail,
    ContactPhone,
    Website,
    MoveDate,
    EmployeeCount,
    OfficeSize,
    EmailStatus,
    ScrapedFrom,
    CreatedAt,
}
