//! Client side of the statistics service.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{StatsError, StatsResult};
use crate::models::{NewEndpointHit, StatsQuery, ViewStats};

/// What the event service needs from the statistics service.
#[async_trait]
pub trait StatsClient: Send + Sync {
    /// Report one hit. Callers treat failures as non-fatal.
    async fn send_hit(&self, hit: NewEndpointHit) -> StatsResult<()>;

    async fn get_stats(&self, query: StatsQuery) -> StatsResult<Vec<ViewStats>>;
}

/// `reqwest` client against a running stats service.
#[derive(Debug, Clone)]
pub struct HttpStatsClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStatsClient {
    /// `base_url` is the prefix `/hit` and `/stats` are appended to.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> StatsResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StatsError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl StatsClient for HttpStatsClient {
    async fn send_hit(&self, hit: NewEndpointHit) -> StatsResult<()> {
        let response = self
            .http
            .post(format!("{}/hit", self.base_url))
            .json(&hit)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StatsError::Client(format!(
                "POST /hit answered {}",
                response.status()
            )));
        }

        tracing::debug!(uri = %hit.uri, "Hit delivered to stats server");
        Ok(())
    }

    async fn get_stats(&self, query: StatsQuery) -> StatsResult<Vec<ViewStats>> {
        let response = self
            .http
            .get(format!("{}/stats", self.base_url))
            .query(&query.to_pairs())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StatsError::Client(format!(
                "GET /stats answered {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = HttpStatsClient::new("http://stats:9090/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://stats:9090/api");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_client_error() {
        let client = HttpStatsClient::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
        let err = client
            .send_hit(NewEndpointHit {
                app: "ewm-main-service".into(),
                uri: "/events".into(),
                ip: "127.0.0.1".into(),
                timestamp: axum_helpers::datetime::now(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::Client(_)));
    }
}
