pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_categories;
mod m20250101_000002_create_users;
mod m20250101_000003_create_events;
mod m20250101_000004_create_participation_requests;
mod m20250101_000005_create_compilations;
mod m20250101_000006_create_marks;
mod m20250101_000100_create_endpoint_hits;

/// Schema of the event service.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_categories::Migration),
            Box::new(m20250101_000002_create_users::Migration),
            Box::new(m20250101_000003_create_events::Migration),
            Box::new(m20250101_000004_create_participation_requests::Migration),
            Box::new(m20250101_000005_create_compilations::Migration),
            Box::new(m20250101_000006_create_marks::Migration),
        ]
    }
}

/// Schema of the statistics service, which owns its own database.
pub struct StatsMigrator;

#[async_trait::async_trait]
impl MigratorTrait for StatsMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000100_create_endpoint_hits::Migration)]
    }
}
