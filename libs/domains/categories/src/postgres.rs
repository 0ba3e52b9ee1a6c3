use async_trait::async_trait;
use axum_helpers::Page;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{CategoryError, CategoryResult},
    models::{Category, CategoryDto, NewCategory},
    repository::CategoryRepository,
};

#[derive(Clone)]
pub struct PgCategoryRepository {
    db: DatabaseConnection,
}

impl PgCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn map_write_error(err: DbErr, id: Uuid, name: &str) -> CategoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CategoryError::DuplicateName(name.to_string()),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => CategoryError::InUse(id),
        _ => CategoryError::Internal(format!("Database error: {}", err)),
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, input: NewCategory) -> CategoryResult<Category> {
        let category = Category::new(input);
        let active_model: entity::ActiveModel = category.clone().into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, category.id, &category.name))?;

        tracing::info!(category_id = %model.id, "Created category");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CategoryError::Internal(format!("Database error: {}", e)))?;

        Ok(model.map(Into::into))
    }

    async fn get_by_ids(&self, ids: Vec<Uuid>) -> CategoryResult<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = entity::Entity::find()
            .filter(entity::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(|e| CategoryError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list(&self, page: Page) -> CategoryResult<Vec<Category>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| CategoryError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, input: CategoryDto) -> CategoryResult<Category> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CategoryError::Internal(format!("Database error: {}", e)))?
            .ok_or(CategoryError::NotFound(id))?;

        let mut active_model: entity::ActiveModel = model.into();
        active_model.name = Set(input.name.clone());

        let updated = active_model
            .update(&self.db)
            .await
            .map_err(|e| map_write_error(e, id, &input.name))?;

        tracing::info!(category_id = %id, "Updated category");
        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> CategoryResult<bool> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| map_write_error(e, id, ""))?;

        if result.rows_affected > 0 {
            tracing::info!(category_id = %id, "Deleted category");
        }
        Ok(result.rows_affected > 0)
    }
}
