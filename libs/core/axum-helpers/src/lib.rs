//! # Axum Helpers
//!
//! Shared HTTP plumbing for the ewm services.
//!
//! ## Modules
//!
//! - **[`server`]**: Router assembly with OpenAPI docs, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (security headers)
//! - **[`errors`]**: Structured error responses with error codes
//! - **[`extractors`]**: Custom extractors (UUID path, validated JSON, paging, request metadata)
//! - **[`datetime`]**: The `yyyy-MM-dd HH:mm:ss` wire format used by every date field
//! - **[`audit`]**: Audit logging for admin actions
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::{cors_origins_from_env, server::{create_production_app, create_router, health_router}};
//! use core_config::{app_info, server::ServerConfig};
//! use std::time::Duration;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let api_routes = Router::new(); // domain routers
//!     let app = create_router::<ApiDoc>(api_routes, cors_origins_from_env()?)
//!         .merge(health_router(app_info!()));
//!     create_production_app(app, &ServerConfig::default(), Duration::from_secs(30), async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod datetime;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

// Re-export server types
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

// Re-export HTTP middleware
pub use http::{create_cors_layer, cors_origins_from_env, security_headers};

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse};

// Re-export extractors
pub use extractors::{
    Page, PageParams, QueryParams, RequestMeta, UuidPath, UuidPathPair, ValidatedJson,
};

// Re-export audit types
pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};

// Re-export date-time wire format helpers
pub use datetime::{DATE_TIME_FORMAT, format_date_time, parse_date_time};
