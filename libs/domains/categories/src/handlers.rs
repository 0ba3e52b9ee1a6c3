use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, PageParams, QueryParams, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestArgumentResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    },
    extract_ip_from_headers,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CategoryResult;
use crate::models::{Category, CategoryDto, NewCategory};
use crate::repository::CategoryRepository;
use crate::service::CategoryService;

pub const TAG: &str = "categories";

#[derive(OpenApi)]
#[openapi(
    paths(
        create_category,
        update_category,
        delete_category,
        list_categories,
        get_category,
    ),
    components(
        schemas(Category, NewCategory, CategoryDto),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestArgumentResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Event categories: admin management and public listing")
    )
)]
pub struct ApiDoc;

/// Admin and public category routes.
pub fn router<R: CategoryRepository + 'static>(service: CategoryService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/admin/categories", post(create_category))
        .route(
            "/admin/categories/{cat_id}",
            patch(update_category).delete(delete_category),
        )
        .route("/categories", get(list_categories))
        .route("/categories/{cat_id}", get(get_category))
        .with_state(shared_service)
}

/// Create a category
#[utoipa::path(
    post,
    path = "/admin/categories",
    tag = TAG,
    request_body = NewCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ValidatedJson(input): ValidatedJson<NewCategory>,
) -> CategoryResult<impl IntoResponse> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Rename a category
#[utoipa::path(
    patch,
    path = "/admin/categories/{cat_id}",
    tag = TAG,
    params(("cat_id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryDto,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<CategoryDto>,
) -> CategoryResult<Json<Category>> {
    let category = service.update_category(id, input).await?;
    Ok(Json(category))
}

/// Delete a category that no event references
#[utoipa::path(
    delete,
    path = "/admin/categories/{cat_id}",
    tag = TAG,
    params(("cat_id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
    headers: HeaderMap,
) -> CategoryResult<StatusCode> {
    let resource = format!("category:{}", id);
    let ip = extract_ip_from_headers(&headers);

    if let Err(err) = service.delete_category(id).await {
        AuditEvent::new("category.delete", resource, AuditOutcome::Failure)
            .with_ip(ip)
            .with_details(err.to_string())
            .log();
        return Err(err);
    }

    AuditEvent::new("category.delete", resource, AuditOutcome::Success)
        .with_ip(ip)
        .log();

    Ok(StatusCode::NO_CONTENT)
}

/// List categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = TAG,
    params(PageParams),
    responses(
        (status = 200, description = "One page of categories", body = Vec<Category>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = service.list_categories(params.page()?).await?;
    Ok(Json(categories))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/categories/{cat_id}",
    tag = TAG,
    params(("cat_id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<Json<Category>> {
    let category = service.get_category(id).await?;
    Ok(Json(category))
}
