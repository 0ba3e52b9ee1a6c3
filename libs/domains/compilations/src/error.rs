use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_events::EventError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CompilationError {
    #[error("Compilation not found: {0}")]
    NotFound(Uuid),

    #[error("Event not found: {0}")]
    EventNotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CompilationResult<T> = Result<T, CompilationError>;

impl From<EventError> for CompilationError {
    fn from(err: EventError) -> Self {
        CompilationError::Internal(err.to_string())
    }
}

impl From<CompilationError> for AppError {
    fn from(err: CompilationError) -> Self {
        match err {
            CompilationError::NotFound(id) => {
                AppError::NotFound(format!("Compilation with id={} was not found", id))
            }
            CompilationError::EventNotFound(id) => {
                AppError::NotFound(format!("Event with id={} was not found", id))
            }
            CompilationError::Validation(msg) => AppError::BadRequest(msg),
            CompilationError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CompilationError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
