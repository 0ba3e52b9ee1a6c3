use async_trait::async_trait;
use axum_helpers::Page;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    entity::{compilation, compilation_event},
    error::{CompilationError, CompilationResult},
    models::Compilation,
    repository::CompilationRepository,
};

#[derive(Clone)]
pub struct PgCompilationRepository {
    db: DatabaseConnection,
}

impl PgCompilationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn internal(err: DbErr) -> CompilationError {
    CompilationError::Internal(format!("Database error: {}", err))
}

/// A link to a missing event trips the foreign key.
fn map_link_error(err: DbErr, compilation: &Compilation) -> CompilationError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            let first = compilation.event_ids.first().copied().unwrap_or(compilation.id);
            CompilationError::EventNotFound(first)
        }
        _ => internal(err),
    }
}

async fn insert_links<C: ConnectionTrait>(conn: &C, compilation: &Compilation) -> Result<(), DbErr> {
    if compilation.event_ids.is_empty() {
        return Ok(());
    }

    let links = compilation
        .event_ids
        .iter()
        .enumerate()
        .map(|(position, event_id)| compilation_event::ActiveModel {
            compilation_id: Set(compilation.id),
            event_id: Set(*event_id),
            position: Set(position as i32),
        });
    compilation_event::Entity::insert_many(links).exec(conn).await?;
    Ok(())
}

impl PgCompilationRepository {
    /// Event ids of each compilation, in stored order.
    async fn links_of(&self, ids: Vec<Uuid>) -> CompilationResult<HashMap<Uuid, Vec<Uuid>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = compilation_event::Entity::find()
            .filter(compilation_event::Column::CompilationId.is_in(ids))
            .order_by_asc(compilation_event::Column::CompilationId)
            .order_by_asc(compilation_event::Column::Position)
            .all(&self.db)
            .await
            .map_err(internal)?;

        let mut links: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in rows {
            links.entry(row.compilation_id).or_default().push(row.event_id);
        }
        Ok(links)
    }
}

#[async_trait]
impl CompilationRepository for PgCompilationRepository {
    async fn create(&self, compilation: Compilation) -> CompilationResult<Compilation> {
        let txn = self.db.begin().await.map_err(internal)?;

        let active_model: compilation::ActiveModel = (&compilation).into();
        active_model.insert(&txn).await.map_err(internal)?;
        insert_links(&txn, &compilation)
            .await
            .map_err(|e| map_link_error(e, &compilation))?;

        txn.commit().await.map_err(internal)?;

        tracing::info!(compilation_id = %compilation.id, "Created compilation");
        Ok(compilation)
    }

    async fn get_by_id(&self, id: Uuid) -> CompilationResult<Option<Compilation>> {
        let Some(model) = compilation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(internal)?
        else {
            return Ok(None);
        };

        let mut links = self.links_of(vec![id]).await?;
        let event_ids = links.remove(&id).unwrap_or_default();
        Ok(Some(model.into_compilation(event_ids)))
    }

    async fn list(&self, pinned: Option<bool>, page: Page) -> CompilationResult<Vec<Compilation>> {
        let mut query = compilation::Entity::find();
        if let Some(pinned) = pinned {
            query = query.filter(compilation::Column::Pinned.eq(pinned));
        }

        let models = query
            .order_by_asc(compilation::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(internal)?;

        let mut links = self.links_of(models.iter().map(|m| m.id).collect()).await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let event_ids = links.remove(&model.id).unwrap_or_default();
                model.into_compilation(event_ids)
            })
            .collect())
    }

    async fn save(&self, compilation: Compilation) -> CompilationResult<Compilation> {
        let txn = self.db.begin().await.map_err(internal)?;

        let active_model: compilation::ActiveModel = (&compilation).into();
        active_model.update(&txn).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => CompilationError::NotFound(compilation.id),
            other => internal(other),
        })?;

        compilation_event::Entity::delete_many()
            .filter(compilation_event::Column::CompilationId.eq(compilation.id))
            .exec(&txn)
            .await
            .map_err(internal)?;
        insert_links(&txn, &compilation)
            .await
            .map_err(|e| map_link_error(e, &compilation))?;

        txn.commit().await.map_err(internal)?;

        tracing::info!(compilation_id = %compilation.id, "Updated compilation");
        Ok(compilation)
    }

    async fn delete(&self, id: Uuid) -> CompilationResult<bool> {
        let result = compilation::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(internal)?;

        if result.rows_affected > 0 {
            tracing::info!(compilation_id = %id, "Deleted compilation");
        }
        Ok(result.rows_affected > 0)
    }
}
