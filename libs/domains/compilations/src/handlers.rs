use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, Page, QueryParams, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestArgumentResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
    extract_ip_from_headers,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CompilationResult;
use crate::models::{CompilationDto, CompilationQuery, NewCompilationDto, UpdateCompilationRequest};
use crate::repository::CompilationRepository;
use crate::service::CompilationService;

pub const TAG: &str = "compilations";

#[derive(OpenApi)]
#[openapi(
    paths(
        create_compilation,
        update_compilation,
        delete_compilation,
        list_compilations,
        get_compilation,
    ),
    components(
        schemas(CompilationDto, NewCompilationDto, UpdateCompilationRequest),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestArgumentResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Event compilations: admin curation and public listing")
    )
)]
pub struct ApiDoc;

/// Admin and public compilation routes.
pub fn router<R: CompilationRepository + 'static>(service: CompilationService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/admin/compilations", post(create_compilation))
        .route(
            "/admin/compilations/{comp_id}",
            patch(update_compilation).delete(delete_compilation),
        )
        .route("/compilations", get(list_compilations))
        .route("/compilations/{comp_id}", get(get_compilation))
        .with_state(shared_service)
}

/// Create a compilation
#[utoipa::path(
    post,
    path = "/admin/compilations",
    tag = TAG,
    request_body = NewCompilationDto,
    responses(
        (status = 201, description = "Compilation created", body = CompilationDto),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_compilation<R: CompilationRepository>(
    State(service): State<Arc<CompilationService<R>>>,
    ValidatedJson(input): ValidatedJson<NewCompilationDto>,
) -> CompilationResult<impl IntoResponse> {
    let compilation = service.create_compilation(input).await?;
    Ok((StatusCode::CREATED, Json(compilation)))
}

/// Change title, pinned flag or event list
#[utoipa::path(
    patch,
    path = "/admin/compilations/{comp_id}",
    tag = TAG,
    params(("comp_id" = Uuid, Path, description = "Compilation ID")),
    request_body = UpdateCompilationRequest,
    responses(
        (status = 200, description = "Compilation updated", body = CompilationDto),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_compilation<R: CompilationRepository>(
    State(service): State<Arc<CompilationService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(patch): ValidatedJson<UpdateCompilationRequest>,
) -> CompilationResult<Json<CompilationDto>> {
    let compilation = service.update_compilation(id, patch).await?;
    Ok(Json(compilation))
}

/// Delete a compilation
#[utoipa::path(
    delete,
    path = "/admin/compilations/{comp_id}",
    tag = TAG,
    params(("comp_id" = Uuid, Path, description = "Compilation ID")),
    responses(
        (status = 204, description = "Compilation deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_compilation<R: CompilationRepository>(
    State(service): State<Arc<CompilationService<R>>>,
    UuidPath(id): UuidPath,
    headers: HeaderMap,
) -> CompilationResult<StatusCode> {
    let resource = format!("compilation:{}", id);
    let ip = extract_ip_from_headers(&headers);

    if let Err(err) = service.delete_compilation(id).await {
        AuditEvent::new("compilation.delete", resource, AuditOutcome::Failure)
            .with_ip(ip)
            .with_details(err.to_string())
            .log();
        return Err(err);
    }

    AuditEvent::new("compilation.delete", resource, AuditOutcome::Success)
        .with_ip(ip)
        .log();

    Ok(StatusCode::NO_CONTENT)
}

/// List compilations
#[utoipa::path(
    get,
    path = "/compilations",
    tag = TAG,
    params(CompilationQuery),
    responses(
        (status = 200, description = "One page of compilations", body = Vec<CompilationDto>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_compilations<R: CompilationRepository>(
    State(service): State<Arc<CompilationService<R>>>,
    QueryParams(query): QueryParams<CompilationQuery>,
) -> Result<Json<Vec<CompilationDto>>, AppError> {
    let page = Page::new(query.from, query.size)?;
    let compilations = service.list_compilations(query.pinned, page).await?;
    Ok(Json(compilations))
}

/// Get a compilation by ID
#[utoipa::path(
    get,
    path = "/compilations/{comp_id}",
    tag = TAG,
    params(("comp_id" = Uuid, Path, description = "Compilation ID")),
    responses(
        (status = 200, description = "Compilation found", body = CompilationDto),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_compilation<R: CompilationRepository>(
    State(service): State<Arc<CompilationService<R>>>,
    UuidPath(id): UuidPath,
) -> CompilationResult<Json<CompilationDto>> {
    let compilation = service.get_compilation(id).await?;
    Ok(Json(compilation))
}
