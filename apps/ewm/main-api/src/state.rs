//! Shared application state.

use domain_stats::StatsClient;
use std::sync::Arc;

/// Cloned into every router that needs it; all fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Client of the statistics service
    pub stats: Arc<dyn StatsClient>,
}
