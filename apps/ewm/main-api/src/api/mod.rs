use axum::{Router, middleware, routing::get};
use axum_helpers::server::{create_router, health_router};
use domain_categories::{CategoryService, PgCategoryRepository};
use domain_compilations::{CompilationService, PgCompilationRepository};
use domain_events::{EventService, PgEventRepository};
use domain_users::{PgUserRepository, UserService};
use observability::{metrics_handler, metrics_middleware};
use std::sync::Arc;

use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod health;

/// Domain routes without the `/api` prefix; `create_router` nests them.
///
/// Category deletes rely on the events foreign key, so the category service
/// gets no usage check here.
pub fn routes(state: &AppState) -> Router {
    let categories = PgCategoryRepository::new(state.db.clone());
    let users = PgUserRepository::new(state.db.clone());

    let events = EventService::new(
        PgEventRepository::new(state.db.clone()),
        Arc::new(categories.clone()),
        Arc::new(users.clone()),
        Arc::clone(&state.stats),
    )
    .with_app_name(state.config.stats.app_name.clone());

    let compilations = CompilationService::new(
        PgCompilationRepository::new(state.db.clone()),
        Arc::new(events.clone()),
    );

    Router::new()
        .merge(domain_categories::handlers::router(CategoryService::new(categories)))
        .merge(domain_users::handlers::router(UserService::new(users)))
        .merge(domain_events::handlers::router(events))
        .merge(domain_compilations::handlers::router(compilations))
}

/// `/ready` with a real database ping.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// The complete service: docs, `/api` routes, probes and `/metrics`.
pub fn app(state: &AppState) -> Router {
    create_router::<ApiDoc>(routes(state), state.config.cors_origins.clone())
        .merge(health_router(state.config.app))
        .merge(ready_router(state.clone()))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment, StatsClientConfig};
    use axum::body::Body;
    use axum::http::{HeaderValue, Request, StatusCode};
    use core_config::{app_info, server::ServerConfig};
    use database::postgres::PostgresConfig;
    use domain_stats::HttpStatsClient;
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::time::Duration;
    use tower::ServiceExt;

    fn state() -> AppState {
        let stats = StatsClientConfig {
            server_url: "http://127.0.0.1:9/api".into(),
            app_name: "ewm-main-service".into(),
            timeout: Duration::from_millis(100),
        };
        let client = HttpStatsClient::new(&stats.server_url, stats.timeout).unwrap();

        AppState {
            config: Config {
                app: app_info!(),
                database: PostgresConfig::new("postgresql://unused"),
                server: ServerConfig::default(),
                environment: Environment::Development,
                cors_origins: vec![HeaderValue::from_static("http://localhost:3000")],
                stats,
                run_migrations: false,
            },
            db: MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            stats: Arc::new(client),
        }
    }

    async fn get_status(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_health_reports_binary_name() {
        let (status, body) = get_status(app(&state()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "ewm_main_api");
    }

    #[tokio::test]
    async fn test_ready_pings_database() {
        let (status, body) = get_status(app(&state()), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_domain_routes_live_under_api() {
        let (status, body) = get_status(app(&state()), "/api/categories?size=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_ARGUMENT");

        let (status, _) = get_status(app(&state()), "/api/compilations/not-a-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_status(app(&state()), "/categories").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
