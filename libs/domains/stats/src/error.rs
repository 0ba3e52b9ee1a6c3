use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Stats server request failed: {0}")]
    Client(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StatsResult<T> = Result<T, StatsError>;

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::InvalidArgument(msg) => AppError::BadRequest(msg),
            StatsError::Client(msg) => AppError::ServiceUnavailable(msg),
            StatsError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<reqwest::Error> for StatsError {
    fn from(err: reqwest::Error) -> Self {
        StatsError::Client(err.to_string())
    }
}
