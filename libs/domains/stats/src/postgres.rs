use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::{
    entity,
    error::{StatsError, StatsResult},
    models::{EndpointHit, NewEndpointHit, StatsWindow, ViewStats},
    repository::StatsRepository,
};

pub struct PgStatsRepository {
    db: DatabaseConnection,
}

impl PgStatsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct ViewStatsRow {
    app: String,
    uri: String,
    hits: i64,
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn save_hit(&self, input: NewEndpointHit) -> StatsResult<EndpointHit> {
        let active_model: entity::ActiveModel = EndpointHit::new(input).into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| StatsError::Internal(format!("Database error: {}", e)))?;

        tracing::debug!(hit_id = %model.id, uri = %model.uri, "Recorded hit");
        Ok(model.into())
    }

    async fn view_stats(&self, window: StatsWindow) -> StatsResult<Vec<ViewStats>> {
        let hits = if window.unique {
            Expr::cust("COUNT(DISTINCT ip)")
        } else {
            Expr::cust("COUNT(*)")
        };

        let rows = entity::Entity::find()
            .select_only()
            .column(entity::Column::App)
            .column(entity::Column::Uri)
            .column_as(hits, "hits")
            .filter(entity::Column::Timestamp.between(window.start, window.end))
            .group_by(entity::Column::App)
            .group_by(entity::Column::Uri)
            .order_by_desc(Expr::cust("hits"))
            .order_by_asc(entity::Column::App)
            .order_by_asc(entity::Column::Uri)
            .into_model::<ViewStatsRow>()
            .all(&self.db)
            .await
            .map_err(|e| StatsError::Internal(format!("Database error: {}", e)))?;

        Ok(rows
            .into_iter()
            .filter(|row| window.uris.is_empty() || window.uris.contains(&row.uri))
            .map(|row| ViewStats {
                app: row.app,
                uri: row.uri,
                hits: row.hits,
            })
            .collect())
    }
}
