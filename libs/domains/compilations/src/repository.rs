use async_trait::async_trait;
use axum_helpers::Page;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CompilationError, CompilationResult};
use crate::models::Compilation;

/// Repository trait for Compilation persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompilationRepository: Send + Sync {
    async fn create(&self, compilation: Compilation) -> CompilationResult<Compilation>;

    async fn get_by_id(&self, id: Uuid) -> CompilationResult<Option<Compilation>>;

    /// One page in creation order, optionally narrowed to pinned or unpinned
    async fn list(&self, pinned: Option<bool>, page: Page) -> CompilationResult<Vec<Compilation>>;

    /// Replace title, flag and event list of an existing compilation
    async fn save(&self, compilation: Compilation) -> CompilationResult<Compilation>;

    /// Delete a compilation; `false` when it did not exist
    async fn delete(&self, id: Uuid) -> CompilationResult<bool>;
}

/// In-memory implementation of CompilationRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCompilationRepository {
    compilations: Arc<RwLock<HashMap<Uuid, Compilation>>>,
}

impl InMemoryCompilationRepository {
    pub fn new() -> Self {
        Self {
            compilations: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl CompilationRepository for InMemoryCompilationRepository {
    async fn create(&self, compilation: Compilation) -> CompilationResult<Compilation> {
        let mut compilations = self.compilations.write().await;
        compilations.insert(compilation.id, compilation.clone());

        tracing::info!(compilation_id = %compilation.id, "Created compilation");
        Ok(compilation)
    }

    async fn get_by_id(&self, id: Uuid) -> CompilationResult<Option<Compilation>> {
        let compilations = self.compilations.read().await;
        Ok(compilations.get(&id).cloned())
    }

    async fn list(&self, pinned: Option<bool>, page: Page) -> CompilationResult<Vec<Compilation>> {
        let compilations = self.compilations.read().await;
        let mut matching: Vec<Compilation> = compilations
            .values()
            .filter(|c| pinned.is_none_or(|p| c.pinned == p))
            .cloned()
            .collect();
        matching.sort_by_key(|c| c.id);
        Ok(page.apply(matching))
    }

    async fn save(&self, compilation: Compilation) -> CompilationResult<Compilation> {
        let mut compilations = self.compilations.write().await;
        let stored = compilations
            .get_mut(&compilation.id)
            .ok_or(CompilationError::NotFound(compilation.id))?;
        *stored = compilation.clone();

        tracing::info!(compilation_id = %compilation.id, "Updated compilation");
        Ok(compilation)
    }

    async fn delete(&self, id: Uuid) -> CompilationResult<bool> {
        let mut compilations = self.compilations.write().await;
        let removed = compilations.remove(&id).is_some();
        if removed {
            tracing::info!(compilation_id = %id, "Deleted compilation");
        }
        Ok(removed)
    }
}
