use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000002_create_users::Users;
use crate::m20250101_000003_create_events::Events;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Marks::Table)
                    .if_not_exists()
                    .col(pk_uuid(Marks::Id))
                    .col(uuid(Marks::EventId))
                    .col(uuid(Marks::UserId))
                    .col(small_integer(Marks::Score))
                    .col(string_len_null(Marks::Message, 2000))
                    .col(timestamp(Marks::MarkedOn))
                    .check(Expr::col(Marks::Score).between(1, 10))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_marks_event_id")
                            .from(Marks::Table, Marks::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_marks_user_id")
                            .from(Marks::Table, Marks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_marks_event_user")
                    .table(Marks::Table)
                    .col(Marks::EventId)
                    .col(Marks::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Marks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Marks {
    Table,
    Id,
    EventId,
    UserId,
    Score,
    Message,
    MarkedOn,
}
