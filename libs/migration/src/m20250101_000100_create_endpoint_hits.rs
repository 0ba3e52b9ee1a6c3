use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EndpointHits::Table)
                    .if_not_exists()
                    .col(pk_uuid(EndpointHits::Id))
                    .col(string_len(EndpointHits::App, 255))
                    .col(string_len(EndpointHits::Uri, 512))
                    .col(string_len(EndpointHits::Ip, 45))
                    .col(timestamp(EndpointHits::Timestamp))
                    .to_owned(),
            )
            .await?;

        // Aggregations scan a time window and group by uri.
        manager
            .create_index(
                Index::create()
                    .name("idx_endpoint_hits_timestamp_uri")
                    .table(EndpointHits::Table)
                    .col(EndpointHits::Timestamp)
                    .col(EndpointHits::Uri)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EndpointHits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EndpointHits {
    Table,
    Id,
    App,
    Uri,
    Ip,
    Timestamp,
}
