use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, Page, PageParams, QueryParams, RequestMeta, UuidPath,
    UuidPathPair, ValidatedJson,
    errors::responses::{
        BadRequestArgumentResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    },
    extract_ip_from_headers,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::EventResult;
use crate::marks::{MarkDto, NewMarkDto};
use crate::models::{
    AdminEventQuery, EventFullDto, EventShortDto, EventState, Location, NewEventDto,
    PublicEventQuery, UpdateEventAdminRequest, UpdateEventUserRequest,
};
use crate::repository::EventRepository;
use crate::requests::{
    EventRequestStatusUpdateRequest, EventRequestStatusUpdateResult, NewRequestQuery,
    ParticipationRequestDto, RequestStatus,
};
use crate::service::EventService;

pub const TAG: &str = "events";
pub const REQUESTS_TAG: &str = "requests";
pub const MARKS_TAG: &str = "marks";

#[derive(OpenApi)]
#[openapi(
    paths(
        list_admin_events,
        update_admin_event,
        list_user_events,
        create_event,
        get_user_event,
        update_user_event,
        list_event_requests,
        update_request_statuses,
        list_user_requests,
        add_request,
        cancel_request,
        add_mark,
        delete_mark,
        list_public_events,
        get_public_event,
        list_event_marks,
    ),
    components(
        schemas(
            EventFullDto,
            EventShortDto,
            EventState,
            Location,
            NewEventDto,
            UpdateEventAdminRequest,
            UpdateEventUserRequest,
            ParticipationRequestDto,
            RequestStatus,
            EventRequestStatusUpdateRequest,
            EventRequestStatusUpdateResult,
            MarkDto,
            NewMarkDto
        ),
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
        (name = TAG, description = "Event search, publication and the initiator's own events"),
        (name = REQUESTS_TAG, description = "Participation requests and their moderation"),
        (name = MARKS_TAG, description = "Participant marks and event ratings")
    )
)]
pub struct ApiDoc;

/// Admin, private (per-user) and public event routes.
pub fn router<R: EventRepository + 'static>(service: EventService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/admin/events", get(list_admin_events))
        .route("/admin/events/{event_id}", patch(update_admin_event))
        .route(
            "/users/{user_id}/events",
            get(list_user_events).post(create_event),
        )
        .route(
            "/users/{user_id}/events/{event_id}",
            get(get_user_event).patch(update_user_event),
        )
        .route(
            "/users/{user_id}/events/{event_id}/requests",
            get(list_event_requests).patch(update_request_statuses),
        )
        .route(
            "/users/{user_id}/requests",
            get(list_user_requests).post(add_request),
        )
        .route(
            "/users/{user_id}/requests/{request_id}/cancel",
            patch(cancel_request),
        )
        .route("/users/{user_id}/events/{event_id}/marks", post(add_mark))
        .route("/users/{user_id}/marks/{mark_id}", delete(delete_mark))
        .route("/events", get(list_public_events))
        .route("/events/{event_id}", get(get_public_event))
        .route("/events/{event_id}/marks", get(list_event_marks))
        .with_state(shared_service)
}

/// Search all events
#[utoipa::path(
    get,
    path = "/admin/events",
    tag = TAG,
    params(AdminEventQuery),
    responses(
        (status = 200, description = "One page of matching events", body = Vec<EventFullDto>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_admin_events<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    QueryParams(query): QueryParams<AdminEventQuery>,
) -> Result<Json<Vec<EventFullDto>>, AppError> {
    let page = Page::new(query.from, query.size)?;
    let events = service.list_admin(query, page).await?;
    Ok(Json(events))
}

/// Edit, publish or reject an event
#[utoipa::path(
    patch,
    path = "/admin/events/{event_id}",
    tag = TAG,
    params(("event_id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventAdminRequest,
    responses(
        (status = 200, description = "Event updated", body = EventFullDto),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_admin_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPath(event_id): UuidPath,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<UpdateEventAdminRequest>,
) -> EventResult<Json<EventFullDto>> {
    let resource = format!("event:{}", event_id);
    let ip = extract_ip_from_headers(&headers);
    let action = input.state_action.clone();

    match service.update_admin_event(event_id, input).await {
        Ok(event) => {
            AuditEvent::new("event.admin_update", resource, AuditOutcome::Success)
                .with_ip(ip)
                .with_details(serde_json::json!({ "stateAction": action, "state": event.state }))
                .log();
            Ok(Json(event))
        }
        Err(err) => {
            AuditEvent::new("event.admin_update", resource, AuditOutcome::Failure)
                .with_ip(ip)
                .with_details(serde_json::json!({ "stateAction": action, "error": err.to_string() }))
                .log();
            Err(err)
        }
    }
}

/// List events the user initiated
#[utoipa::path(
    get,
    path = "/users/{user_id}/events",
    tag = TAG,
    params(("user_id" = Uuid, Path, description = "User ID"), PageParams),
    responses(
        (status = 200, description = "One page of the user's events", body = Vec<EventShortDto>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_user_events<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPath(user_id): UuidPath,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Vec<EventShortDto>>, AppError> {
    let events = service.list_user_events(user_id, params.page()?).await?;
    Ok(Json(events))
}

/// Create an event; it starts PENDING
#[utoipa::path(
    post,
    path = "/users/{user_id}/events",
    tag = TAG,
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = NewEventDto,
    responses(
        (status = 201, description = "Event created", body = EventFullDto),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPath(user_id): UuidPath,
    ValidatedJson(input): ValidatedJson<NewEventDto>,
) -> EventResult<impl IntoResponse> {
    let event = service.create_event(user_id, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Get one of the user's events
#[utoipa::path(
    get,
    path = "/users/{user_id}/events/{event_id}",
    tag = TAG,
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = EventFullDto),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPathPair(user_id, event_id): UuidPathPair,
) -> EventResult<Json<EventFullDto>> {
    let event = service.get_user_event(user_id, event_id).await?;
    Ok(Json(event))
}

/// Edit one of the user's unpublished events
#[utoipa::path(
    patch,
    path = "/users/{user_id}/events/{event_id}",
    tag = TAG,
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventUserRequest,
    responses(
        (status = 200, description = "Event updated", body = EventFullDto),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPathPair(user_id, event_id): UuidPathPair,
    ValidatedJson(input): ValidatedJson<UpdateEventUserRequest>,
) -> EventResult<Json<EventFullDto>> {
    let event = service.update_user_event(user_id, event_id, input).await?;
    Ok(Json(event))
}

/// Participation requests filed for the user's event
#[utoipa::path(
    get,
    path = "/users/{user_id}/events/{event_id}/requests",
    tag = REQUESTS_TAG,
    params(
        ("user_id" = Uuid, Path, description = "Initiator ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Requests for the event", body = Vec<ParticipationRequestDto>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_event_requests<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPathPair(user_id, event_id): UuidPathPair,
) -> EventResult<Json<Vec<ParticipationRequestDto>>> {
    let requests = service.list_event_requests(user_id, event_id).await?;
    Ok(Json(requests))
}

/// Confirm or reject pending requests for the user's event
#[utoipa::path(
    patch,
    path = "/users/{user_id}/events/{event_id}/requests",
    tag = REQUESTS_TAG,
    params(
        ("user_id" = Uuid, Path, description = "Initiator ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = EventRequestStatusUpdateRequest,
    responses(
        (status = 200, description = "Requests confirmed and rejected, in processing order", body = EventRequestStatusUpdateResult),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_request_statuses<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPathPair(user_id, event_id): UuidPathPair,
    ValidatedJson(input): ValidatedJson<EventRequestStatusUpdateRequest>,
) -> EventResult<Json<EventRequestStatusUpdateResult>> {
    let result = service
        .update_request_statuses(user_id, event_id, input)
        .await?;
    Ok(Json(result))
}

/// Requests the user has filed
#[utoipa::path(
    get,
    path = "/users/{user_id}/requests",
    tag = REQUESTS_TAG,
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user's requests", body = Vec<ParticipationRequestDto>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_user_requests<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPath(user_id): UuidPath,
) -> EventResult<Json<Vec<ParticipationRequestDto>>> {
    let requests = service.list_user_requests(user_id).await?;
    Ok(Json(requests))
}

/// Ask to take part in an event
#[utoipa::path(
    post,
    path = "/users/{user_id}/requests",
    tag = REQUESTS_TAG,
    params(("user_id" = Uuid, Path, description = "User ID"), NewRequestQuery),
    responses(
        (status = 201, description = "Request filed", body = ParticipationRequestDto),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_request<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPath(user_id): UuidPath,
    QueryParams(query): QueryParams<NewRequestQuery>,
) -> EventResult<impl IntoResponse> {
    let request = service.add_request(user_id, query.event_id).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Withdraw a request
#[utoipa::path(
    patch,
    path = "/users/{user_id}/requests/{request_id}/cancel",
    tag = REQUESTS_TAG,
    params(
        ("user_id" = Uuid, Path, description = "Requester ID"),
        ("request_id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request canceled", body = ParticipationRequestDto),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn cancel_request<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPathPair(user_id, request_id): UuidPathPair,
) -> EventResult<Json<ParticipationRequestDto>> {
    let request = service.cancel_request(user_id, request_id).await?;
    Ok(Json(request))
}

/// Rate an attended event
#[utoipa::path(
    post,
    path = "/users/{user_id}/events/{event_id}/marks",
    tag = MARKS_TAG,
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = NewMarkDto,
    responses(
        (status = 201, description = "Mark stored", body = MarkDto),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_mark<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPathPair(user_id, event_id): UuidPathPair,
    ValidatedJson(input): ValidatedJson<NewMarkDto>,
) -> EventResult<impl IntoResponse> {
    let mark = service.add_mark(user_id, event_id, input).await?;
    Ok((StatusCode::CREATED, Json(mark)))
}

/// Remove one of the user's marks
#[utoipa::path(
    delete,
    path = "/users/{user_id}/marks/{mark_id}",
    tag = MARKS_TAG,
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("mark_id" = Uuid, Path, description = "Mark ID")
    ),
    responses(
        (status = 204, description = "Mark deleted"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_mark<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPathPair(user_id, mark_id): UuidPathPair,
) -> EventResult<StatusCode> {
    service.delete_mark(user_id, mark_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search published events
#[utoipa::path(
    get,
    path = "/events",
    tag = TAG,
    params(PublicEventQuery),
    responses(
        (status = 200, description = "One page of published events", body = Vec<EventFullDto>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_public_events<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    meta: RequestMeta,
    QueryParams(query): QueryParams<PublicEventQuery>,
) -> Result<Json<Vec<EventFullDto>>, AppError> {
    let page = Page::new(query.from, query.size)?;
    let events = service.list_public(query, page, &meta).await?;
    Ok(Json(events))
}

/// Get a published event; counts as a view
#[utoipa::path(
    get,
    path = "/events/{event_id}",
    tag = TAG,
    params(("event_id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event found", body = EventFullDto),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_public_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPath(event_id): UuidPath,
    meta: RequestMeta,
) -> EventResult<Json<EventFullDto>> {
    let event = service.get_public_event(event_id, &meta).await?;
    Ok(Json(event))
}

/// Marks left on a published event
#[utoipa::path(
    get,
    path = "/events/{event_id}/marks",
    tag = MARKS_TAG,
    params(("event_id" = Uuid, Path, description = "Event ID"), PageParams),
    responses(
        (status = 200, description = "One page of marks", body = Vec<MarkDto>),
        (status = 400, response = BadRequestArgumentResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_event_marks<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPath(event_id): UuidPath,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Vec<MarkDto>>, AppError> {
    let marks = service.list_event_marks(event_id, params.page()?).await?;
    Ok(Json(marks))
}
