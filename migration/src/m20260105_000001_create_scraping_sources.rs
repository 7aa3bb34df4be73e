use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create scraping_sources table
        manager
            .create_table(
                Table::create()
                    .table(ScrapingSources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScrapingSources::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScrapingSources::Name).string().not_null())
                    .col(ColumnDef::new(ScrapingSources::Url).string().not_null())
                    .col(ColumnDef::new(ScrapingSources::Selectors).json().not_null())
                    .col(ColumnDef::new(ScrapingSources::AuthCredential).string())
                    .col(
                        ColumnDef::new(ScrapingSources::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ScrapingSources::LastScraped).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ScrapingSources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScrapingSources::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ScrapingSources {
    Table,
    Id,
    Name,
    Url,
    Selectors,
    AuthCredential,
    Enabled,
    LastScraped,
    CreatedAt,
}
