use axum::{
    Router,
    extract::State,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::server::{HealthCheckFuture, create_router, health_router, run_health_checks};
use domain_stats::{PgStatsRepository, StatsService};
use observability::{metrics_handler, metrics_middleware};

use crate::openapi::ApiDoc;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    let service = StatsService::new(PgStatsRepository::new(state.db.clone()));
    domain_stats::handlers::router(service)
}

async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            database::postgres::check_health(&state.db)
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}

pub fn app(state: &AppState) -> Router {
    let ready = Router::new()
        .route("/ready", get(ready_handler))
        .with_state(state.clone());

    create_router::<ApiDoc>(routes(state), state.config.cors_origins.clone())
        .merge(health_router(state.config.app))
        .merge(ready)
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware))
}
