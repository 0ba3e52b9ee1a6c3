use observability::StatsMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;
use validator::Validate;

use crate::error::{StatsError, StatsResult};
use crate::models::{EndpointHit, NewEndpointHit, StatsQuery, ViewStats};
use crate::repository::StatsRepository;

/// Service layer for hit ingestion and aggregation
#[derive(Clone)]
pub struct StatsService<R: StatsRepository> {
    repository: Arc<R>,
}

impl<R: StatsRepository> StatsService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(app = %input.app, uri = %input.uri))]
    pub async fn record_hit(&self, input: NewEndpointHit) -> StatsResult<EndpointHit> {
        input
            .validate()
            .map_err(|e| StatsError::InvalidArgument(e.to_string()))?;

        let hit = self.repository.save_hit(input).await?;
        StatsMetrics::record_hit(&hit.app);
        Ok(hit)
    }

    #[instrument(skip(self, query), fields(unique = query.unique))]
    pub async fn query_stats(&self, query: StatsQuery) -> StatsResult<Vec<ViewStats>> {
        let window = query.window()?;
        let unique = window.unique;

        let started = Instant::now();
        let rows = self.repository.view_stats(window).await?;
        StatsMetrics::record_query(unique, rows.len(), started.elapsed());

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockStatsRepository;

    #[tokio::test]
    async fn test_inverted_window_never_reaches_store() {
        let mut mock_repo = MockStatsRepository::new();
        mock_repo.expect_view_stats().never();

        let service = StatsService::new(mock_repo);
        let err = service
            .query_stats(StatsQuery {
                start: "2024-01-02 00:00:00".into(),
                end: "2024-01-01 00:00:00".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_unique_flag_reaches_store() {
        let mut mock_repo = MockStatsRepository::new();
        mock_repo
            .expect_view_stats()
            .withf(|window| window.unique && window.uris == vec!["/events".to_string()])
            .returning(|_| {
                Ok(vec![ViewStats {
                    app: "ewm-main-service".into(),
                    uri: "/events".into(),
                    hits: 2,
                }])
            });

        let service = StatsService::new(mock_repo);
        let rows = service
            .query_stats(StatsQuery {
                start: "2024-01-01 00:00:00".into(),
                end: "2024-01-02 00:00:00".into(),
                uris: vec!["/events".into()],
                unique: true,
            })
            .await
            .unwrap();
        assert_eq!(rows[0].hits, 2);
    }

    #[tokio::test]
    async fn test_blank_app_is_rejected() {
        let mut mock_repo = MockStatsRepository::new();
        mock_repo.expect_save_hit().never();

        let service = StatsService::new(mock_repo);
        let err = service
            .record_hit(NewEndpointHit {
                app: String::new(),
                uri: "/events".into(),
                ip: "10.0.0.1".into(),
                timestamp: axum_helpers::datetime::now(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidArgument(_)));
    }
}
