//! Query-string extractor that accepts repeated keys (`ids=1&ids=2`).

use crate::errors::AppError;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

/// Like `axum::extract::Query` but backed by `axum_extra`'s form decoder, so
/// sequence fields collect every occurrence of a key. Rejections render as
/// `INVALID_QUERY` errors.
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum_extra::extract::Query(value) =
            axum_extra::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e| AppError::InvalidQuery(e.body_text()).into_response())?;
        Ok(QueryParams(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Filter {
        #[serde(default)]
        ids: Vec<u32>,
        size: Option<u64>,
    }

    #[tokio::test]
    async fn test_repeated_keys_collect() {
        let (mut parts, _) = Request::builder()
            .uri("/admin/users?ids=1&ids=2&size=5")
            .body(())
            .unwrap()
            .into_parts();

        let QueryParams(filter) = QueryParams::<Filter>::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(filter.ids, vec![1, 2]);
        assert_eq!(filter.size, Some(5));
    }

    #[tokio::test]
    async fn test_malformed_value_is_rejected() {
        let (mut parts, _) = Request::builder()
            .uri("/admin/users?size=ten")
            .body(())
            .unwrap()
            .into_parts();

        let rejection = QueryParams::<Filter>::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
