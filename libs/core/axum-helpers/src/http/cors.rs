use axum::http::{HeaderValue, Method, header};
use core_config::{ConfigError, env_required};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Parse `CORS_ALLOWED_ORIGIN` (comma-separated) into header values.
pub fn cors_origins_from_env() -> Result<Vec<HeaderValue>, ConfigError> {
    let raw = env_required("CORS_ALLOWED_ORIGIN")?;
    parse_origins(&raw)
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::ParseError {
                key: "CORS_ALLOWED_ORIGIN".to_string(),
                details: format!("{}: {}", origin, e),
            })
        })
        .collect()
}

/// CORS layer restricted to the configured origins and the verbs the API uses.
pub fn create_cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_origins() {
        let origins = parse_origins("http://localhost:3000, https://ewm.example").unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://ewm.example");
    }

    #[test]
    fn test_missing_origin_env_is_an_error() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            assert!(cors_origins_from_env().is_err());
        });
    }
}
