//! UUID path parameter extractors with automatic validation.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Extractor for a single UUID path parameter.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::extractors::UuidPath;
///
/// async fn get_category(UuidPath(id): UuidPath) -> String {
///     format!("Category ID: {}", id)
/// }
///
/// let app = Router::new().route("/categories/{cat_id}", get(get_category));
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        parse_uuid(&id).map(UuidPath)
    }
}

/// Extractor for routes carrying two UUIDs, e.g. `/users/{user_id}/events/{event_id}`.
///
/// Segments bind in declaration order.
pub struct UuidPathPair(pub Uuid, pub Uuid);

impl<S> FromRequestParts<S> for UuidPathPair
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((first, second)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        Ok(UuidPathPair(parse_uuid(&first)?, parse_uuid(&second)?))
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|e| {
        tracing::debug!(value = raw, "rejecting path parameter: {}", e);
        AppError::UuidError(e).into_response()
    })
}
