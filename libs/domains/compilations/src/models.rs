use domain_events::EventShortDto;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A titled, ordered set of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub id: Uuid,
    pub title: String,
    pub pinned: bool,
    /// Events in display order, without repeats
    pub event_ids: Vec<Uuid>,
}

impl Compilation {
    pub fn new(input: NewCompilationDto) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            pinned: input.pinned,
            event_ids: distinct(input.events),
        }
    }

    /// Overwrite whatever the patch carries.
    pub fn apply(&mut self, patch: UpdateCompilationRequest) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(pinned) = patch.pinned {
            self.pinned = pinned;
        }
        if let Some(events) = patch.events {
            self.event_ids = distinct(events);
        }
    }
}

/// Drop repeated ids, keeping the first occurrence.
pub fn distinct(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Body of `POST /admin/compilations`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct NewCompilationDto {
    #[serde(default)]
    pub events: Vec<Uuid>,
    #[serde(default)]
    pub pinned: bool,
    #[validate(length(min = 1, max = 50))]
    pub title: String,
}

/// Body of `PATCH /admin/compilations/{comp_id}`; absent fields are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateCompilationRequest {
    pub events: Option<Vec<Uuid>>,
    pub pinned: Option<bool>,
    #[validate(length(min = 1, max = 50))]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompilationDto {
    pub id: Uuid,
    pub title: String,
    pub pinned: bool,
    pub events: Vec<EventShortDto>,
}

/// Query of `GET /compilations`
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompilationQuery {
    /// Only pinned (or only unpinned) compilations
    pub pinned: Option<bool>,
    pub from: Option<u64>,
    pub size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_compilation(events: Vec<Uuid>) -> NewCompilationDto {
        NewCompilationDto {
            events,
            pinned: false,
            title: "Summer".into(),
        }
    }

    #[test]
    fn test_new_compilation_drops_repeated_events() {
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let compilation = Compilation::new(new_compilation(vec![b, a, b]));
        assert_eq!(compilation.event_ids, vec![b, a]);
    }

    #[test]
    fn test_apply_keeps_absent_fields() {
        let event = Uuid::now_v7();
        let mut compilation = Compilation::new(new_compilation(vec![event]));

        compilation.apply(UpdateCompilationRequest {
            pinned: Some(true),
            ..Default::default()
        });
        assert!(compilation.pinned);
        assert_eq!(compilation.title, "Summer");
        assert_eq!(compilation.event_ids, vec![event]);

        compilation.apply(UpdateCompilationRequest {
            events: Some(Vec::new()),
            ..Default::default()
        });
        assert!(compilation.event_ids.is_empty());
    }

    #[test]
    fn test_title_bounds() {
        assert!(new_compilation(vec![]).validate().is_ok());

        let mut blank = new_compilation(vec![]);
        blank.title = String::new();
        assert!(blank.validate().is_err());

        let long = UpdateCompilationRequest {
            title: Some("x".repeat(51)),
            ..Default::default()
        };
        assert!(long.validate().is_err());
        assert!(UpdateCompilationRequest::default().validate().is_ok());
    }

    #[test]
    fn test_defaults_when_deserializing() {
        let input: NewCompilationDto = serde_json::from_str(r#"{"title":"Summer"}"#).unwrap();
        assert!(input.events.is_empty());
        assert!(!input.pinned);
    }
}
