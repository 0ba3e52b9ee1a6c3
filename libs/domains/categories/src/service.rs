use axum_helpers::Page;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CategoryDto, NewCategory};
use crate::repository::{CategoryRepository, CategoryUsage};

/// Service layer for Category business logic
#[derive(Clone)]
pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
    usage: Option<Arc<dyn CategoryUsage>>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            usage: None,
        }
    }

    /// Refuse deletes while `usage` reports the category as referenced.
    pub fn with_usage(mut self, usage: Arc<dyn CategoryUsage>) -> Self {
        self.usage = Some(usage);
        self
    }

    #[instrument(skip(self, input), fields(category_name = %input.name))]
    pub async fn create_category(&self, input: NewCategory) -> CategoryResult<Category> {
        input
            .validate()
            .map_err(|e| CategoryError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: Uuid) -> CategoryResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound(id))
    }

    pub async fn list_categories(&self, page: Page) -> CategoryResult<Vec<Category>> {
        self.repository.list(page).await
    }

    #[instrument(skip(self, input), fields(category_id = %id))]
    pub async fn update_category(&self, id: Uuid, input: CategoryDto) -> CategoryResult<Category> {
        input
            .validate()
            .map_err(|e| CategoryError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: Uuid) -> CategoryResult<()> {
        if let Some(usage) = &self.usage {
            if usage.is_in_use(id).await? {
                return Err(CategoryError::InUse(id));
            }
        }

        if !self.repository.delete(id).await? {
            return Err(CategoryError::NotFound(id));
        }
        Ok(())
    }
}
