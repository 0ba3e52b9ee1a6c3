use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000001_create_categories::Categories;
use crate::m20250101_000002_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(EventState::Enum)
                    .values([EventState::Pending, EventState::Published, EventState::Canceled])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_uuid(Events::Id))
                    .col(string_len(Events::Title, 120))
                    .col(string_len(Events::Annotation, 2000))
                    .col(string_len(Events::Description, 7000))
                    .col(uuid(Events::CategoryId))
                    .col(uuid(Events::InitiatorId))
                    .col(double(Events::Lat))
                    .col(double(Events::Lon))
                    .col(boolean(Events::Paid).default(false))
                    .col(integer(Events::ParticipantLimit).default(0))
                    .col(boolean(Events::RequestModeration).default(true))
                    .col(
                        ColumnDef::new(Events::State)
                            .enumeration(
                                EventState::Enum,
                                [EventState::Pending, EventState::Published, EventState::Canceled],
                            )
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(timestamp(Events::EventDate))
                    .col(timestamp(Events::CreatedOn))
                    .col(timestamp_null(Events::PublishedOn))
                    .col(integer(Events::ConfirmedRequests).default(0))
                    .col(big_integer(Events::Views).default(0))
                    .check(Expr::col(Events::ParticipantLimit).gte(0))
                    .check(Expr::col(Events::ConfirmedRequests).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_category_id")
                            .from(Events::Table, Events::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_initiator_id")
                            .from(Events::Table, Events::InitiatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_events_state", Events::State),
            ("idx_events_event_date", Events::EventDate),
            ("idx_events_category_id", Events::CategoryId),
            ("idx_events_initiator_id", Events::InitiatorId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Events::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(EventState::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Events {
    Table,
    Id,
    Title,
    Annotation,
    Description,
    CategoryId,
    InitiatorId,
    Lat,
    Lon,
    Paid,
    ParticipantLimit,
    RequestModeration,
    State,
    EventDate,
    CreatedOn,
    PublishedOn,
    ConfirmedRequests,
    Views,
}

#[derive(DeriveIden)]
enum EventState {
    #[sea_orm(iden = "event_state")]
    Enum,
    #[sea_orm(iden = "PENDING")]
    Pending,
    #[sea_orm(iden = "PUBLISHED")]
    Published,
    #[sea_orm(iden = "CANCELED")]
    Canceled,
}
