use async_trait::async_trait;
use axum_helpers::{Page, RequestMeta, datetime, parse_date_time};
use chrono::{Duration, NaiveDateTime};
use domain_categories::{Category, CategoryError, CategoryRepository, CategoryResult, CategoryUsage};
use domain_stats::{NewEndpointHit, StatsClient};
use domain_users::{User, UserRepository, UserShortDto};
use observability::{EventMetrics, StatsMetrics};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{EventError, EventResult};
use crate::filter::{admin_filter, parse_sort, public_filter};
use crate::marks::{Mark, MarkDto, NewMarkDto, check_can_mark};
use crate::models::{
    AdminEventQuery, Event, EventFullDto, EventShortDto, EventState, NewEventDto,
    PublicEventQuery, UpdateEventAdminRequest, UpdateEventUserRequest,
};
use crate::repository::EventRepository;
use crate::requests::{
    EventRequestStatusUpdateRequest, EventRequestStatusUpdateResult, ParticipationRequestDto,
    RequestStatus,
};
use crate::update::{Actor, UpdatePatch, ensure_owner_may_edit};

/// App name reported with every hit
pub const DEFAULT_APP_NAME: &str = "ewm-main-service";

/// How far ahead of now an initiator must schedule an event
pub const MIN_LEAD_TIME_HOURS: i64 = 2;

/// Short representations of events, for collections that embed them.
#[async_trait]
pub trait EventLookup: Send + Sync {
    /// Events of `ids` that exist, in the order given
    async fn short_events(&self, ids: Vec<Uuid>) -> EventResult<Vec<EventShortDto>>;
}

/// Service layer for events, participation requests and marks
pub struct EventService<R: EventRepository> {
    repository: Arc<R>,
    categories: Arc<dyn CategoryRepository>,
    users: Arc<dyn UserRepository>,
    stats: Arc<dyn StatsClient>,
    app_name: String,
}

impl<R: EventRepository> Clone for EventService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            categories: Arc::clone(&self.categories),
            users: Arc::clone(&self.users),
            stats: Arc::clone(&self.stats),
            app_name: self.app_name.clone(),
        }
    }
}

fn validation(err: validator::ValidationErrors) -> EventError {
    EventError::InvalidArgument(err.to_string())
}

fn check_lead_time(event_date: NaiveDateTime, now: NaiveDateTime) -> EventResult<()> {
    if event_date < now + Duration::hours(MIN_LEAD_TIME_HOURS) {
        return Err(EventError::InvalidArgument(format!(
            "Field: eventDate. Error: must be at least {} hours from now. Value: {}",
            MIN_LEAD_TIME_HOURS,
            datetime::format_date_time(&event_date)
        )));
    }
    Ok(())
}

/// Categories and initiators referenced by a set of events
struct References {
    categories: HashMap<Uuid, Category>,
    initiators: HashMap<Uuid, UserShortDto>,
}

impl References {
    fn resolve(&self, event: &Event) -> Option<(Category, UserShortDto)> {
        let category = self.categories.get(&event.category_id);
        let initiator = self.initiators.get(&event.initiator_id);
        match (category, initiator) {
            (Some(c), Some(u)) => Some((c.clone(), u.clone())),
            _ => {
                tracing::warn!(event_id = %event.id, "Event references a missing category or initiator");
                None
            }
        }
    }
}

fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

impl<R: EventRepository> EventService<R> {
    pub fn new(
        repository: R,
        categories: Arc<dyn CategoryRepository>,
        users: Arc<dyn UserRepository>,
        stats: Arc<dyn StatsClient>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            categories,
            users,
            stats,
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    async fn require_user(&self, id: Uuid) -> EventResult<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(EventError::UserNotFound(id))
    }

    async fn require_category(&self, id: Uuid) -> EventResult<Category> {
        self.categories
            .get_by_id(id)
            .await?
            .ok_or(EventError::CategoryNotFound(id))
    }

    async fn require_event(&self, id: Uuid) -> EventResult<Event> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(EventError::EventNotFound(id))
    }

    /// The event, provided `user_id` exists and initiated it
    async fn owned_event(&self, user_id: Uuid, event_id: Uuid) -> EventResult<Event> {
        self.require_user(user_id).await?;
        let event = self.require_event(event_id).await?;
        if event.initiator_id != user_id {
            return Err(EventError::EventNotFound(event_id));
        }
        Ok(event)
    }

    async fn references(&self, events: &[Event]) -> EventResult<References> {
        let category_ids = distinct(events.iter().map(|e| e.category_id));
        let user_ids = distinct(events.iter().map(|e| e.initiator_id));

        let categories = self
            .categories
            .get_by_ids(category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let initiators = self
            .users
            .get_by_ids(user_ids)
            .await?
            .iter()
            .map(|u| (u.id, UserShortDto::from(u)))
            .collect();

        Ok(References {
            categories,
            initiators,
        })
    }

    async fn to_full(&self, events: Vec<Event>) -> EventResult<Vec<EventFullDto>> {
        let refs = self.references(&events).await?;
        let ratings = self
            .repository
            .ratings(events.iter().map(|e| e.id).collect())
            .await?;

        Ok(events
            .into_iter()
            .filter_map(|event| {
                let (category, initiator) = refs.resolve(&event)?;
                let rating = ratings.get(&event.id).copied();
                Some(EventFullDto::new(event, category, initiator, rating))
            })
            .collect())
    }

    async fn to_short(&self, events: Vec<Event>) -> EventResult<Vec<EventShortDto>> {
        let refs = self.references(&events).await?;
        Ok(events
            .into_iter()
            .filter_map(|event| {
                let (category, initiator) = refs.resolve(&event)?;
                Some(EventShortDto::new(event, category, initiator))
            })
            .collect())
    }

    async fn full_dto(&self, event: Event) -> EventResult<EventFullDto> {
        let category = self.require_category(event.category_id).await?;
        let initiator = self.require_user(event.initiator_id).await?;
        let rating = self
            .repository
            .ratings(vec![event.id])
            .await?
            .get(&event.id)
            .copied();
        Ok(EventFullDto::new(
            event,
            category,
            UserShortDto::from(&initiator),
            rating,
        ))
    }

    /// Report a public request to the stats service without waiting for it.
    fn emit_hit(&self, meta: &RequestMeta) {
        let hit = NewEndpointHit {
            app: self.app_name.clone(),
            uri: meta.uri.clone(),
            ip: meta.ip.clone(),
            timestamp: datetime::now(),
        };
        let stats = Arc::clone(&self.stats);

        tokio::spawn(async move {
            let uri = hit.uri.clone();
            if let Err(e) = stats.send_hit(hit).await {
                tracing::warn!(error = %e, uri = %uri, "Failed to record endpoint hit");
                StatsMetrics::record_emission_failure();
            }
        });
    }

    // Initiator operations

    #[instrument(skip(self, input), fields(user_id = %user_id, category_id = %input.category))]
    pub async fn create_event(&self, user_id: Uuid, input: NewEventDto) -> EventResult<EventFullDto> {
        input.validate().map_err(validation)?;

        let now = datetime::now();
        let event_date = parse_date_time(&input.event_date)
            .map_err(|e| EventError::InvalidArgument(format!("eventDate is malformed: {}", e)))?;
        check_lead_time(event_date, now)?;

        let initiator = self.require_user(user_id).await?;
        let category = self.require_category(input.category).await?;

        let event = self
            .repository
            .create(Event::new(user_id, input, event_date, now))
            .await?;
        EventMetrics::record_created();

        Ok(EventFullDto::new(
            event,
            category,
            UserShortDto::from(&initiator),
            None,
        ))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_user_events(&self, user_id: Uuid, page: Page) -> EventResult<Vec<EventShortDto>> {
        self.require_user(user_id).await?;
        let events = self.repository.list_by_initiator(user_id, page).await?;
        self.to_short(events).await
    }

    #[instrument(skip(self), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn get_user_event(&self, user_id: Uuid, event_id: Uuid) -> EventResult<EventFullDto> {
        let event = self.owned_event(user_id, event_id).await?;
        self.full_dto(event).await
    }

    #[instrument(skip(self, input), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn update_user_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        input: UpdateEventUserRequest,
    ) -> EventResult<EventFullDto> {
        input.validate().map_err(validation)?;

        let event = self.owned_event(user_id, event_id).await?;
        ensure_owner_may_edit(&event)?;

        let patch = UpdatePatch::from_owner(input)?;
        let now = datetime::now();
        if let Some(event_date) = patch.event_date {
            check_lead_time(event_date, now)?;
        }
        if let Some(category_id) = patch.category_id {
            self.require_category(category_id).await?;
        }

        // state rules are checked again against the stored event
        let applied = self
            .repository
            .update(event_id, patch, Actor::Owner, now)
            .await?;

        if applied.previous != EventState::Canceled && applied.event.state == EventState::Canceled {
            EventMetrics::record_canceled();
        }
        self.full_dto(applied.event).await
    }

    // Admin operations

    #[instrument(skip(self, query))]
    pub async fn list_admin(&self, query: AdminEventQuery, page: Page) -> EventResult<Vec<EventFullDto>> {
        let filter = admin_filter(&query)?;
        let events = self.repository.search(filter, None, page).await?;
        self.to_full(events).await
    }

    #[instrument(skip(self, input), fields(event_id = %event_id))]
    pub async fn update_admin_event(
        &self,
        event_id: Uuid,
        input: UpdateEventAdminRequest,
    ) -> EventResult<EventFullDto> {
        input.validate().map_err(validation)?;

        let patch = UpdatePatch::from_admin(input)?;
        if let Some(category_id) = patch.category_id {
            self.require_category(category_id).await?;
        }

        let applied = self
            .repository
            .update(event_id, patch, Actor::Admin, datetime::now())
            .await?;
        let saved = applied.event;

        match (applied.previous, saved.state) {
            (EventState::Pending, EventState::Published) => EventMetrics::record_published(),
            (from, EventState::Canceled) if from != EventState::Canceled => {
                EventMetrics::record_rejected()
            }
            _ => {}
        }
        self.full_dto(saved).await
    }

    // Public operations

    #[instrument(skip(self, query, meta), fields(uri = %meta.uri))]
    pub async fn list_public(
        &self,
        query: PublicEventQuery,
        page: Page,
        meta: &RequestMeta,
    ) -> EventResult<Vec<EventFullDto>> {
        let filter = public_filter(&query, datetime::now())?;
        let sort = parse_sort(query.sort.as_deref())?;

        let events = self.repository.search(filter, sort, page).await?;
        self.emit_hit(meta);
        self.to_full(events).await
    }

    #[instrument(skip(self, meta), fields(event_id = %id))]
    pub async fn get_public_event(&self, id: Uuid, meta: &RequestMeta) -> EventResult<EventFullDto> {
        let event = self.require_event(id).await?;
        if event.state != EventState::Published {
            return Err(EventError::EventNotFound(id));
        }

        let event = self.repository.increment_views(id).await?;
        EventMetrics::record_view();
        self.emit_hit(meta);
        self.full_dto(event).await
    }

    // Participation requests

    #[instrument(skip(self), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn list_event_requests(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> EventResult<Vec<ParticipationRequestDto>> {
        self.owned_event(user_id, event_id).await?;
        let requests = self.repository.list_requests_by_event(event_id).await?;
        Ok(requests.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, input), fields(user_id = %user_id, event_id = %event_id, status = %input.status))]
    pub async fn update_request_statuses(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        input: EventRequestStatusUpdateRequest,
    ) -> EventResult<EventRequestStatusUpdateResult> {
        self.owned_event(user_id, event_id).await?;

        let outcome = self
            .repository
            .moderate_requests(event_id, input.request_ids, input.status)
            .await?;
        EventMetrics::record_moderation(outcome.confirmed.len(), outcome.rejected.len());

        Ok(EventRequestStatusUpdateResult {
            confirmed_requests: outcome.confirmed.into_iter().map(Into::into).collect(),
            rejected_requests: outcome.rejected.into_iter().map(Into::into).collect(),
        })
    }

    #[instrument(skip(self), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn add_request(&self, user_id: Uuid, event_id: Uuid) -> EventResult<ParticipationRequestDto> {
        self.require_user(user_id).await?;

        let request = self
            .repository
            .add_request(event_id, user_id, datetime::now())
            .await?;
        EventMetrics::record_request_status(match request.status {
            RequestStatus::Confirmed => "confirmed",
            _ => "pending",
        });

        Ok(request.into())
    }

    #[instrument(skip(self), fields(user_id = %user_id, request_id = %request_id))]
    pub async fn cancel_request(&self, user_id: Uuid, request_id: Uuid) -> EventResult<ParticipationRequestDto> {
        self.require_user(user_id).await?;

        let request = self.repository.cancel_request(request_id, user_id).await?;
        EventMetrics::record_request_status("canceled");

        Ok(request.into())
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_user_requests(&self, user_id: Uuid) -> EventResult<Vec<ParticipationRequestDto>> {
        self.require_user(user_id).await?;
        let requests = self.repository.list_requests_by_requester(user_id).await?;
        Ok(requests.into_iter().map(Into::into).collect())
    }

    // Marks

    #[instrument(skip(self, input), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn add_mark(&self, user_id: Uuid, event_id: Uuid, input: NewMarkDto) -> EventResult<MarkDto> {
        input.validate().map_err(validation)?;

        self.require_user(user_id).await?;
        let event = self.require_event(event_id).await?;
        let confirmed = self.repository.has_confirmed_request(event_id, user_id).await?;
        let already_marked = self.repository.find_mark(event_id, user_id).await?.is_some();
        check_can_mark(&event, confirmed, already_marked)?;

        let mark = self
            .repository
            .add_mark(Mark::new(event_id, user_id, input, datetime::now()))
            .await?;
        Ok(mark.into())
    }

    #[instrument(skip(self), fields(user_id = %user_id, mark_id = %mark_id))]
    pub async fn delete_mark(&self, user_id: Uuid, mark_id: Uuid) -> EventResult<()> {
        self.require_user(user_id).await?;

        match self.repository.get_mark(mark_id).await? {
            Some(mark) if mark.user_id == user_id => {}
            _ => return Err(EventError::MarkNotFound(mark_id)),
        }
        if !self.repository.delete_mark(mark_id).await? {
            return Err(EventError::MarkNotFound(mark_id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(event_id = %event_id))]
    pub async fn list_event_marks(&self, event_id: Uuid, page: Page) -> EventResult<Vec<MarkDto>> {
        let event = self.require_event(event_id).await?;
        if event.state != EventState::Published {
            return Err(EventError::EventNotFound(event_id));
        }
        let marks = self.repository.list_marks(event_id, page).await?;
        Ok(marks.into_iter().map(Into::into).collect())
    }
}

impl<R: EventRepository + 'static> EventService<R> {
    /// Reports categories referenced by stored events as in use.
    pub fn category_usage(&self) -> Arc<dyn CategoryUsage> {
        Arc::new(EventCategoryUsage {
            repository: Arc::clone(&self.repository),
        })
    }
}

struct EventCategoryUsage<R: EventRepository> {
    repository: Arc<R>,
}

#[async_trait]
impl<R: EventRepository> CategoryUsage for EventCategoryUsage<R> {
    async fn is_in_use(&self, category_id: Uuid) -> CategoryResult<bool> {
        self.repository
            .exists_with_category(category_id)
            .await
            .map_err(|e| CategoryError::Internal(e.to_string()))
    }
}

#[async_trait]
impl<R: EventRepository> EventLookup for EventService<R> {
    async fn short_events(&self, ids: Vec<Uuid>) -> EventResult<Vec<EventShortDto>> {
        let ids = distinct(ids.into_iter());
        let mut events = self.repository.get_by_ids(ids.clone()).await?;
        events.sort_by_key(|e| ids.iter().position(|id| *id == e.id));
        self.to_short(events).await
    }
}
