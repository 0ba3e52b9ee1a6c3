use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000002_create_users::Users;
use crate::m20250101_000003_create_events::Events;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let statuses = [
            RequestStatus::Pending,
            RequestStatus::Confirmed,
            RequestStatus::Rejected,
            RequestStatus::Canceled,
        ];

        manager
            .create_type(
                Type::create()
                    .as_enum(RequestStatus::Enum)
                    .values(statuses)
                    .to_owned(),
            )
            .await?;

        let statuses = [
            RequestStatus::Pending,
            RequestStatus::Confirmed,
            RequestStatus::Rejected,
            RequestStatus::Canceled,
        ];

        manager
            .create_table(
                Table::create()
                    .table(ParticipationRequests::Table)
                    .if_not_exists()
                    .col(pk_uuid(ParticipationRequests::Id))
                    .col(uuid(ParticipationRequests::EventId))
                    .col(uuid(ParticipationRequests::RequesterId))
                    .col(
                        ColumnDef::new(ParticipationRequests::Status)
                            .enumeration(RequestStatus::Enum, statuses)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(timestamp(ParticipationRequests::Created))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participation_requests_event_id")
                            .from(ParticipationRequests::Table, ParticipationRequests::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participation_requests_requester_id")
                            .from(ParticipationRequests::Table, ParticipationRequests::RequesterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One request per user and event.
        manager
            .create_index(
                Index::create()
                    .name("uq_participation_requests_event_requester")
                    .table(ParticipationRequests::Table)
                    .col(ParticipationRequests::EventId)
                    .col(ParticipationRequests::RequesterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_participation_requests_requester_id")
                    .table(ParticipationRequests::Table)
                    .col(ParticipationRequests::RequesterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParticipationRequests::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(RequestStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ParticipationRequests {
    Table,
    Id,
    EventId,
    RequesterId,
    Status,
    Created,
}

#[derive(DeriveIden)]
enum RequestStatus {
    #[sea_orm(iden = "request_status")]
    Enum,
    #[sea_orm(iden = "PENDING")]
    Pending,
    #[sea_orm(iden = "CONFIRMED")]
    Confirmed,
    #[sea_orm(iden = "REJECTED")]
    Rejected,
    #[sea_orm(iden = "CANCELED")]
    Canceled,
}
