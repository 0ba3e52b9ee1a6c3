use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    QueryParams, ValidatedJson,
    errors::responses::{
        BadRequestArgumentResponse, BadRequestValidationResponse, InternalServerErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::StatsResult;
use crate::models::{EndpointHit, NewEndpointHit, StatsQuery, ViewStats};
use crate::repository::StatsRepository;
use crate::service::StatsService;

pub const TAG: &str = "stats";

#[derive(OpenApi)]
#[openapi(
    paths(save_hit, get_stats),
    components(
        schemas(EndpointHit, NewEndpointHit, ViewStats),
        responses(
            BadRequestValidationResponse,
            BadRequestArgumentResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Endpoint hit log and view statistics")
    )
)]
pub struct ApiDoc;

pub fn router<R: StatsRepository + 'static>(service: StatsService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/hit", post(save_hit))
        .route("/stats", get(get_stats))
        .with_state(shared_service)
}

/// Record one endpoint hit
#[utoipa::path(
    post,
    path = "/hit",
    tag = TAG,
    request_body = NewEndpointHit,
    responses(
        (status = 201, description = "Hit stored", body = EndpointHit),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn save_hit<R: StatsRepository>(
    State(service): State<Arc<StatsService<R>>>,
    ValidatedJson(input): ValidatedJson<NewEndpointHit>,
) -> StatsResult<impl IntoResponse> {
    let hit = service.record_hit(input).await?;
    Ok((StatusCode::CREATED, Json(hit)))
}

/// Hit counts per uri inside a time window
#[utoipa::path(
    get,
    path = "/stats",
    tag = TAG,
    params(StatsQuery),
    responses(
        (status = 200, description = "Rows ordered by hits descending", body = Vec<ViewStats>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_stats<R: StatsRepository>(
    State(service): State<Arc<StatsService<R>>>,
    QueryParams(query): QueryParams<StatsQuery>,
) -> StatsResult<Json<Vec<ViewStats>>> {
    let rows = service.query_stats(query).await?;
    Ok(Json(rows))
}
