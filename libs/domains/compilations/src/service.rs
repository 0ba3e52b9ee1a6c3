use axum_helpers::Page;
use domain_events::{EventLookup, EventShortDto};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CompilationError, CompilationResult};
use crate::models::{Compilation, CompilationDto, NewCompilationDto, UpdateCompilationRequest};
use crate::repository::CompilationRepository;

/// Service layer for compilations; event summaries come from `EventLookup`.
pub struct CompilationService<R: CompilationRepository> {
    repository: Arc<R>,
    events: Arc<dyn EventLookup>,
}

impl<R: CompilationRepository> Clone for CompilationService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            events: Arc::clone(&self.events),
        }
    }
}

fn validation(err: validator::ValidationErrors) -> CompilationError {
    CompilationError::Validation(err.to_string())
}

impl<R: CompilationRepository> CompilationService<R> {
    pub fn new(repository: R, events: Arc<dyn EventLookup>) -> Self {
        Self {
            repository: Arc::new(repository),
            events,
        }
    }

    /// Summaries of `ids` in the given order; every id must resolve.
    async fn resolve_events(&self, ids: &[Uuid]) -> CompilationResult<Vec<EventShortDto>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.events.short_events(ids.to_vec()).await?;
        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|e| e.id == **id)) {
            return Err(CompilationError::EventNotFound(*missing));
        }
        Ok(found)
    }

    async fn to_dto(&self, compilation: Compilation) -> CompilationResult<CompilationDto> {
        let events = self.events.short_events(compilation.event_ids).await?;
        Ok(CompilationDto {
            id: compilation.id,
            title: compilation.title,
            pinned: compilation.pinned,
            events,
        })
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_compilation(
        &self,
        input: NewCompilationDto,
    ) -> CompilationResult<CompilationDto> {
        input.validate().map_err(validation)?;

        let compilation = Compilation::new(input);
        let events = self.resolve_events(&compilation.event_ids).await?;
        let created = self.repository.create(compilation).await?;

        Ok(CompilationDto {
            id: created.id,
            title: created.title,
            pinned: created.pinned,
            events,
        })
    }

    #[instrument(skip(self, patch), fields(compilation_id = %id))]
    pub async fn update_compilation(
        &self,
        id: Uuid,
        patch: UpdateCompilationRequest,
    ) -> CompilationResult<CompilationDto> {
        patch.validate().map_err(validation)?;

        let mut compilation = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(CompilationError::NotFound(id))?;

        let events_changed = patch.events.is_some();
        compilation.apply(patch);
        if events_changed {
            self.resolve_events(&compilation.event_ids).await?;
        }

        let saved = self.repository.save(compilation).await?;
        self.to_dto(saved).await
    }

    #[instrument(skip(self), fields(compilation_id = %id))]
    pub async fn delete_compilation(&self, id: Uuid) -> CompilationResult<()> {
        if !self.repository.delete(id).await? {
            return Err(CompilationError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(compilation_id = %id))]
    pub async fn get_compilation(&self, id: Uuid) -> CompilationResult<CompilationDto> {
        let compilation = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(CompilationError::NotFound(id))?;
        self.to_dto(compilation).await
    }

    pub async fn list_compilations(
        &self,
        pinned: Option<bool>,
        page: Page,
    ) -> CompilationResult<Vec<CompilationDto>> {
        let compilations = self.repository.list(pinned, page).await?;

        let mut dtos = Vec::with_capacity(compilations.len());
        for compilation in compilations {
            dtos.push(self.to_dto(compilation).await?);
        }
        Ok(dtos)
    }
}
