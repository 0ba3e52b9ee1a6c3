use async_trait::async_trait;
use axum_helpers::Page;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::filter::{EventFilter, sort_events};
use crate::marks::{Mark, average_scores};
use crate::models::{Event, EventSort};
use crate::moderation::{ModerationOutcome, moderate, order_batch};
use crate::requests::{ParticipationRequest, RequestStatus, admit, withdraw};
use crate::update::{Actor, AppliedUpdate, UpdatePatch, apply_update};

/// Repository trait for events, their participation requests and marks.
///
/// Operations that move an event's `confirmed_requests` counter run as one
/// atomic step against that event.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: Event) -> EventResult<Event>;

    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Event>>;

    /// Fetch every event in `ids` that exists; missing ids are skipped
    async fn get_by_ids(&self, ids: Vec<Uuid>) -> EventResult<Vec<Event>>;

    /// One page of events matching `filter`; `None` sort keeps creation order
    async fn search(
        &self,
        filter: EventFilter,
        sort: Option<EventSort>,
        page: Page,
    ) -> EventResult<Vec<Event>>;

    async fn list_by_initiator(&self, initiator_id: Uuid, page: Page) -> EventResult<Vec<Event>>;

    /// Apply `patch` to the stored event and persist it as one atomic step.
    ///
    /// State rules run against the stored row, so an update decided on an
    /// older read cannot undo a transition made in between. Counters are
    /// never taken from the patch.
    async fn update(
        &self,
        id: Uuid,
        patch: UpdatePatch,
        actor: Actor,
        now: NaiveDateTime,
    ) -> EventResult<AppliedUpdate>;

    /// `views = views + 1`, returning the updated event
    async fn increment_views(&self, id: Uuid) -> EventResult<Event>;

    async fn exists_with_category(&self, category_id: Uuid) -> EventResult<bool>;

    async fn list_requests_by_event(&self, event_id: Uuid) -> EventResult<Vec<ParticipationRequest>>;

    async fn list_requests_by_requester(
        &self,
        requester_id: Uuid,
    ) -> EventResult<Vec<ParticipationRequest>>;

    /// File a participation request, confirming it on the spot when the
    /// event needs no moderation
    async fn add_request(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
        now: NaiveDateTime,
    ) -> EventResult<ParticipationRequest>;

    async fn cancel_request(
        &self,
        request_id: Uuid,
        requester_id: Uuid,
    ) -> EventResult<ParticipationRequest>;

    /// Run a moderation batch against one event; nothing is written if any
    /// request is refused
    async fn moderate_requests(
        &self,
        event_id: Uuid,
        request_ids: Vec<Uuid>,
        status: RequestStatus,
    ) -> EventResult<ModerationOutcome>;

    async fn has_confirmed_request(&self, event_id: Uuid, user_id: Uuid) -> EventResult<bool>;

    async fn add_mark(&self, mark: Mark) -> EventResult<Mark>;

    async fn get_mark(&self, id: Uuid) -> EventResult<Option<Mark>>;

    async fn find_mark(&self, event_id: Uuid, user_id: Uuid) -> EventResult<Option<Mark>>;

    async fn delete_mark(&self, id: Uuid) -> EventResult<bool>;

    async fn list_marks(&self, event_id: Uuid, page: Page) -> EventResult<Vec<Mark>>;

    /// Average mark per event; unrated events are absent
    async fn ratings(&self, event_ids: Vec<Uuid>) -> EventResult<HashMap<Uuid, f64>>;
}

#[derive(Debug, Default)]
struct EventStore {
    events: HashMap<Uuid, Event>,
    requests: HashMap<Uuid, ParticipationRequest>,
    marks: HashMap<Uuid, Mark>,
}

/// In-memory implementation of EventRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventRepository {
    store: Arc<RwLock<EventStore>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_id<T: Clone>(items: impl Iterator<Item = T>, id: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| id(item));
    items
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, event: Event) -> EventResult<Event> {
        let mut store = self.store.write().await;
        store.events.insert(event.id, event.clone());

        tracing::info!(event_id = %event.id, "Created event");
        Ok(event)
    }

    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Event>> {
        let store = self.store.read().await;
        Ok(store.events.get(&id).cloned())
    }

    async fn get_by_ids(&self, ids: Vec<Uuid>) -> EventResult<Vec<Event>> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.events.get(id).cloned()).collect())
    }

    async fn search(
        &self,
        filter: EventFilter,
        sort: Option<EventSort>,
        page: Page,
    ) -> EventResult<Vec<Event>> {
        let store = self.store.read().await;
        let mut events: Vec<Event> = store
            .events
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        sort_events(&mut events, sort);
        Ok(page.apply(events))
    }

    async fn list_by_initiator(&self, initiator_id: Uuid, page: Page) -> EventResult<Vec<Event>> {
        let store = self.store.read().await;
        let events = sorted_by_id(
            store
                .events
                .values()
                .filter(|e| e.initiator_id == initiator_id)
                .cloned(),
            |e| e.id,
        );
        Ok(page.apply(events))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: UpdatePatch,
        actor: Actor,
        now: NaiveDateTime,
    ) -> EventResult<AppliedUpdate> {
        let mut store = self.store.write().await;
        let event = store
            .events
            .get_mut(&id)
            .ok_or(EventError::EventNotFound(id))?;

        let previous = event.state;
        apply_update(event, patch, actor, now)?;

        tracing::info!(event_id = %id, state = %event.state, "Updated event");
        Ok(AppliedUpdate {
            previous,
            event: event.clone(),
        })
    }

    async fn increment_views(&self, id: Uuid) -> EventResult<Event> {
        let mut store = self.store.write().await;
        let event = store
            .events
            .get_mut(&id)
            .ok_or(EventError::EventNotFound(id))?;
        event.views += 1;
        Ok(event.clone())
    }

    async fn exists_with_category(&self, category_id: Uuid) -> EventResult<bool> {
        let store = self.store.read().await;
        Ok(store.events.values().any(|e| e.category_id == category_id))
    }

    async fn list_requests_by_event(&self, event_id: Uuid) -> EventResult<Vec<ParticipationRequest>> {
        let store = self.store.read().await;
        Ok(sorted_by_id(
            store
                .requests
                .values()
                .filter(|r| r.event_id == event_id)
                .cloned(),
            |r| r.id,
        ))
    }

    async fn list_requests_by_requester(
        &self,
        requester_id: Uuid,
    ) -> EventResult<Vec<ParticipationRequest>> {
        let store = self.store.read().await;
        Ok(sorted_by_id(
            store
                .requests
                .values()
                .filter(|r| r.requester_id == requester_id)
                .cloned(),
            |r| r.id,
        ))
    }

    async fn add_request(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
        now: NaiveDateTime,
    ) -> EventResult<ParticipationRequest> {
        let mut store = self.store.write().await;
        let already_requested = store
            .requests
            .values()
            .any(|r| r.event_id == event_id && r.requester_id == requester_id);

        let event = store
            .events
            .get_mut(&event_id)
            .ok_or(EventError::EventNotFound(event_id))?;
        let request = admit(event, requester_id, already_requested, now)?;
        store.requests.insert(request.id, request.clone());

        tracing::info!(request_id = %request.id, event_id = %event_id, status = %request.status, "Created participation request");
        Ok(request)
    }

    async fn cancel_request(
        &self,
        request_id: Uuid,
        requester_id: Uuid,
    ) -> EventResult<ParticipationRequest> {
        let mut guard = self.store.write().await;
        let store = &mut *guard;

        let request = store
            .requests
            .get_mut(&request_id)
            .ok_or(EventError::RequestNotFound(request_id))?;
        let event = store
            .events
            .get_mut(&request.event_id)
            .ok_or(EventError::EventNotFound(request.event_id))?;
        withdraw(event, request, requester_id)?;

        tracing::info!(request_id = %request_id, "Canceled participation request");
        Ok(request.clone())
    }

    async fn moderate_requests(
        &self,
        event_id: Uuid,
        request_ids: Vec<Uuid>,
        status: RequestStatus,
    ) -> EventResult<ModerationOutcome> {
        let mut guard = self.store.write().await;
        let store = &mut *guard;

        let found = request_ids
            .iter()
            .filter_map(|id| store.requests.get(id).cloned())
            .collect();
        let mut batch = order_batch(&request_ids, found, event_id)?;

        let event = store
            .events
            .get_mut(&event_id)
            .ok_or(EventError::EventNotFound(event_id))?;
        let outcome = moderate(event, &mut batch, status)?;

        for request in batch {
            store.requests.insert(request.id, request);
        }

        tracing::info!(
            event_id = %event_id,
            confirmed = outcome.confirmed.len(),
            rejected = outcome.rejected.len(),
            "Moderated participation requests"
        );
        Ok(outcome)
    }

    async fn has_confirmed_request(&self, event_id: Uuid, user_id: Uuid) -> EventResult<bool> {
        let store = self.store.read().await;
        Ok(store.requests.values().any(|r| {
            r.event_id == event_id && r.requester_id == user_id && r.status == RequestStatus::Confirmed
        }))
    }

    async fn add_mark(&self, mark: Mark) -> EventResult<Mark> {
        let mut store = self.store.write().await;
        if store
            .marks
            .values()
            .any(|m| m.event_id == mark.event_id && m.user_id == mark.user_id)
        {
            return Err(EventError::IllegalOperation(
                "The event has already been rated by this user".to_string(),
            ));
        }
        store.marks.insert(mark.id, mark.clone());

        tracing::info!(mark_id = %mark.id, event_id = %mark.event_id, "Created mark");
        Ok(mark)
    }

    async fn get_mark(&self, id: Uuid) -> EventResult<Option<Mark>> {
        let store = self.store.read().await;
        Ok(store.marks.get(&id).cloned())
    }

    async fn find_mark(&self, event_id: Uuid, user_id: Uuid) -> EventResult<Option<Mark>> {
        let store = self.store.read().await;
        Ok(store
            .marks
            .values()
            .find(|m| m.event_id == event_id && m.user_id == user_id)
            .cloned())
    }

    async fn delete_mark(&self, id: Uuid) -> EventResult<bool> {
        let mut store = self.store.write().await;
        Ok(store.marks.remove(&id).is_some())
    }

    async fn list_marks(&self, event_id: Uuid, page: Page) -> EventResult<Vec<Mark>> {
        let store = self.store.read().await;
        let marks = sorted_by_id(
            store.marks.values().filter(|m| m.event_id == event_id).cloned(),
            |m| m.id,
        );
        Ok(page.apply(marks))
    }

    async fn ratings(&self, event_ids: Vec<Uuid>) -> EventResult<HashMap<Uuid, f64>> {
        let store = self.store.read().await;
        Ok(average_scores(
            store.marks.values().filter(|m| event_ids.contains(&m.event_id)),
        ))
    }
}
