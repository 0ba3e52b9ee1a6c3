use axum_helpers::server::create_production_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_stats::HttpStatsClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    observability::init_metrics().map_err(|e| eyre::eyre!("Metrics recorder failed: {}", e))?;

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name)
            .await
            .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
    }

    let stats = HttpStatsClient::new(config.stats.server_url.clone(), config.stats.timeout)
        .map_err(|e| eyre::eyre!("Statistics client setup failed: {}", e))?;
    info!(
        stats_url = %stats.base_url(),
        app_name = %config.stats.app_name,
        "Reporting views to the statistics service"
    );

    let state = AppState {
        config,
        db,
        stats: Arc::new(stats),
    };

    let app = api::app(&state);
    let server = state.config.server.clone();
    let db = state.db.clone();

    info!("Starting event service (30s shutdown timeout)");

    create_production_app(
        app,
        &server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing database connections");
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Event service shutdown complete");
    Ok(())
}
