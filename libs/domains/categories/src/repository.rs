use async_trait::async_trait;
use axum_helpers::Page;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CategoryDto, NewCategory};

/// Repository trait for Category persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category, rejecting duplicate names
    async fn create(&self, input: NewCategory) -> CategoryResult<Category>;

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>>;

    /// Fetch every category in `ids` that exists; missing ids are skipped
    async fn get_by_ids(&self, ids: Vec<Uuid>) -> CategoryResult<Vec<Category>>;

    /// One page of categories in creation order
    async fn list(&self, page: Page) -> CategoryResult<Vec<Category>>;

    async fn update(&self, id: Uuid, input: CategoryDto) -> CategoryResult<Category>;

    /// Delete a category; `false` when it did not exist
    async fn delete(&self, id: Uuid) -> CategoryResult<bool>;
}

/// Answers whether anything still references a category.
///
/// The PostgreSQL schema enforces this with a foreign key; the in-memory setup
/// needs the event store to answer.
#[async_trait]
pub trait CategoryUsage: Send + Sync {
    async fn is_in_use(&self, category_id: Uuid) -> CategoryResult<bool>;
}

/// In-memory implementation of CategoryRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<HashMap<Uuid, Category>>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            categories: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn name_taken(categories: &HashMap<Uuid, Category>, name: &str, except: Option<Uuid>) -> bool {
    categories
        .values()
        .any(|c| Some(c.id) != except && c.name == name)
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, input: NewCategory) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;

        if name_taken(&categories, &input.name, None) {
            return Err(CategoryError::DuplicateName(input.name));
        }

        let category = Category::new(input);
        categories.insert(category.id, category.clone());

        tracing::info!(category_id = %category.id, "Created category");
        Ok(category)
    }

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.get(&id).cloned())
    }

    async fn get_by_ids(&self, ids: Vec<Uuid>) -> CategoryResult<Vec<Category>> {
        let categories = self.categories.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| categories.get(id).cloned())
            .collect())
    }

    async fn list(&self, page: Page) -> CategoryResult<Vec<Category>> {
        let categories = self.categories.read().await;
        let mut all: Vec<Category> = categories.values().cloned().collect();
        all.sort_by_key(|c| c.id);
        Ok(page.apply(all))
    }

    async fn update(&self, id: Uuid, input: CategoryDto) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;

        if !categories.contains_key(&id) {
            return Err(CategoryError::NotFound(id));
        }
        if name_taken(&categories, &input.name, Some(id)) {
            return Err(CategoryError::DuplicateName(input.name));
        }

        let category = categories
            .get_mut(&id)
            .ok_or(CategoryError::NotFound(id))?;
        category.name = input.name;

        tracing::info!(category_id = %id, "Updated category");
        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> CategoryResult<bool> {
        let mut categories = self.categories.write().await;
        let removed = categories.remove(&id).is_some();
        if removed {
            tracing::info!(category_id = %id, "Deleted category");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_category(name: &str) -> NewCategory {
        NewCategory { name: name.to_string() }
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected() {
        let repo = InMemoryCategoryRepository::new();
        repo.create(new_category("Concerts")).await.unwrap();

        let err = repo.create(new_category("Concerts")).await.unwrap_err();
        assert!(matches!(err, CategoryError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_update_may_keep_own_name() {
        let repo = InMemoryCategoryRepository::new();
        let category = repo.create(new_category("Concerts")).await.unwrap();

        let updated = repo
            .update(category.id, CategoryDto { name: "Concerts".into() })
            .await
            .unwrap();
        assert_eq!(updated.name, "Concerts");
    }

    #[tokio::test]
    async fn test_update_to_taken_name_conflicts() {
        let repo = InMemoryCategoryRepository::new();
        repo.create(new_category("Concerts")).await.unwrap();
        let theatre = repo.create(new_category("Theatre")).await.unwrap();

        let err = repo
            .update(theatre.id, CategoryDto { name: "Concerts".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_list_pages_in_creation_order() {
        let repo = InMemoryCategoryRepository::new();
        for name in ["a", "b", "c"] {
            repo.create(new_category(name)).await.unwrap();
        }

        let page = Page::new(Some(2), Some(2)).unwrap();
        let names: Vec<String> = repo
            .list(page)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["c"]);
    }

    #[tokio::test]
    async fn test_get_by_ids_skips_missing() {
        let repo = InMemoryCategoryRepository::new();
        let a = repo.create(new_category("a")).await.unwrap();

        let found = repo.get_by_ids(vec![a.id, Uuid::now_v7()]).await.unwrap();
        assert_eq!(found, vec![a]);
    }
}
