use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::aggregate::aggregate;
use crate::error::StatsResult;
use crate::models::{EndpointHit, NewEndpointHit, StatsWindow, ViewStats};

/// Repository trait for the hit log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Append one hit
    async fn save_hit(&self, input: NewEndpointHit) -> StatsResult<EndpointHit>;

    /// Per-uri counts inside the window, most hit first
    async fn view_stats(&self, window: StatsWindow) -> StatsResult<Vec<ViewStats>>;
}

/// In-memory hit log (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryStatsRepository {
    hits: Arc<RwLock<Vec<EndpointHit>>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn save_hit(&self, input: NewEndpointHit) -> StatsResult<EndpointHit> {
        let hit = EndpointHit::new(input);
        self.hits.write().await.push(hit.clone());

        tracing::debug!(hit_id = %hit.id, uri = %hit.uri, "Recorded hit");
        Ok(hit)
    }

    async fn view_stats(&self, window: StatsWindow) -> StatsResult<Vec<ViewStats>> {
        let hits = self.hits.read().await;
        Ok(aggregate(hits.iter(), &window))
    }
}
