use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, Page, QueryParams, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestArgumentResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    },
    extract_ip_from_headers,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{NewUserRequest, User, UserFilter};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, delete_user),
    components(
        schemas(User, NewUserRequest),
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
        (name = TAG, description = "Admin user management")
    )
)]
pub struct ApiDoc;

pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/{user_id}", delete(delete_user))
        .with_state(shared_service)
}

/// List users, optionally restricted to a set of ids
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = TAG,
    params(UserFilter),
    responses(
        (status = 200, description = "One page of users", body = Vec<User>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    QueryParams(filter): QueryParams<UserFilter>,
) -> Result<Json<Vec<User>>, AppError> {
    let page = Page::new(filter.from, filter.size)?;
    let users = service.list_users(filter.ids, page).await?;
    Ok(Json(users))
}

/// Register a user
#[utoipa::path(
    post,
    path = "/admin/users",
    tag = TAG,
    request_body = NewUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<NewUserRequest>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete a user together with their events
#[utoipa::path(
    delete,
    path = "/admin/users/{user_id}",
    tag = TAG,
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    headers: HeaderMap,
) -> UserResult<StatusCode> {
    service.delete_user(id).await?;

    AuditEvent::new("user.delete", format!("user:{}", id), AuditOutcome::Success)
        .with_ip(extract_ip_from_headers(&headers))
        .log();

    Ok(StatusCode::NO_CONTENT)
}
