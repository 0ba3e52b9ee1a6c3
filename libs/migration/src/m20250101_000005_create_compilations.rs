use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000003_create_events::Events;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Compilations::Table)
                    .if_not_exists()
                    .col(pk_uuid(Compilations::Id))
                    .col(string_len(Compilations::Title, 50))
                    .col(boolean(Compilations::Pinned).default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CompilationEvents::Table)
                    .if_not_exists()
                    .col(uuid(CompilationEvents::CompilationId))
                    .col(uuid(CompilationEvents::EventId))
                    .col(integer(CompilationEvents::Position).default(0))
                    .primary_key(
                        Index::create()
                            .col(CompilationEvents::CompilationId)
                            .col(CompilationEvents::EventId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_compilation_events_compilation_id")
                            .from(CompilationEvents::Table, CompilationEvents::CompilationId)
                            .to(Compilations::Table, Compilations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_compilation_events_event_id")
                            .from(CompilationEvents::Table, CompilationEvents::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_compilations_pinned")
                    .table(Compilations::Table)
                    .col(Compilations::Pinned)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CompilationEvents::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Compilations::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Compilations {
    Table,
    Id,
    Title,
    Pinned,
}

#[derive(DeriveIden)]
enum CompilationEvents {
    Table,
    CompilationId,
    EventId,
    Position,
}
