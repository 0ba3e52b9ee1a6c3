use sea_orm::DatabaseConnection;
use tracing::debug;

use crate::common::DatabaseError;

/// Readiness probe: round-trips a ping over a pooled connection.
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    debug!("Running PostgreSQL health check");

    db.ping().await.map_err(|e| {
        DatabaseError::HealthCheckFailed(format!("PostgreSQL health check failed: {}", e))
    })?;

    debug!("PostgreSQL health check passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_mock_connection_is_healthy() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        assert!(check_health(&db).await.is_ok());
    }
}
