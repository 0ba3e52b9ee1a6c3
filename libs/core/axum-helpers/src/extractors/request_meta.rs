//! Caller metadata (request path and client address) used for hit recording.

use crate::audit::{extract_ip_from_headers, extract_ip_from_socket};
use axum::{
    extract::{ConnectInfo, FromRequestParts, OriginalUri},
    http::request::Parts,
};
use std::{convert::Infallible, net::SocketAddr};

const UNKNOWN_IP: &str = "0.0.0.0";

/// Path and client IP of the current request.
///
/// The IP comes from proxy headers first, then the socket when the server was
/// started with `into_make_service_with_connect_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub uri: String,
    pub ip: String,
}

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers strip their prefix from `parts.uri`.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let socket = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);

        let ip = extract_ip_from_headers(&parts.headers)
            .or_else(|| extract_ip_from_socket(socket))
            .unwrap_or_else(|| UNKNOWN_IP.to_string());

        Ok(Self { uri, ip })
    }
}
