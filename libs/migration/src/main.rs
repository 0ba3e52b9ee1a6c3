use migration::{Migrator, StatsMigrator};
use sea_orm_migration::cli;

/// `MIGRATION_TARGET=stats` runs the statistics schema; anything else runs the event schema.
#[tokio::main]
async fn main() {
    match std::env::var("MIGRATION_TARGET").as_deref() {
        Ok("stats") => cli::run_cli(StatsMigrator).await,
        _ => cli::run_cli(Migrator).await,
    }
}
