use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_categories::CategoryError;
use domain_users::UserError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event with id={0} was not found")]
    EventNotFound(Uuid),

    #[error("User with id={0} was not found")]
    UserNotFound(Uuid),

    #[error("Category with id={0} was not found")]
    CategoryNotFound(Uuid),

    #[error("Request with id={0} was not found")]
    RequestNotFound(Uuid),

    #[error("Mark with id={0} was not found")]
    MarkNotFound(Uuid),

    /// Malformed or out-of-range input: bad dates, inverted ranges, unknown sort keys
    #[error("{0}")]
    InvalidArgument(String),

    /// The request is well-formed but the current state forbids it
    #[error("{0}")]
    IllegalOperation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EventResult<T> = Result<T, EventError>;

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::EventNotFound(_)
            | EventError::UserNotFound(_)
            | EventError::CategoryNotFound(_)
            | EventError::RequestNotFound(_)
            | EventError::MarkNotFound(_) => AppError::NotFound(err.to_string()),
            EventError::InvalidArgument(msg) => AppError::BadRequest(msg),
            EventError::IllegalOperation(msg) => AppError::Conflict(msg),
            EventError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<CategoryError> for EventError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound(id) => EventError::CategoryNotFound(id),
            CategoryError::Validation(msg) => EventError::InvalidArgument(msg),
            other => EventError::Internal(other.to_string()),
        }
    }
}

impl From<UserError> for EventError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => EventError::UserNotFound(id),
            UserError::Validation(msg) => EventError::InvalidArgument(msg),
            other => EventError::Internal(other.to_string()),
        }
    }
}
