use axum_helpers::datetime;
use chrono::NaiveDateTime;
use domain_categories::Category;
use domain_users::UserShortDto;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Event lifecycle
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "event_state")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    /// Awaiting admin review
    #[default]
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PUBLISHED")]
    Published,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

/// State changes an admin may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStateAction {
    PublishEvent,
    RejectEvent,
}

/// State changes the initiator may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStateAction {
    SendToReview,
    CancelReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// An event as stored
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category_id: Uuid,
    pub initiator_id: Uuid,
    pub location: Location,
    pub paid: bool,
    /// 0 means unlimited
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    pub event_date: NaiveDateTime,
    pub created_on: NaiveDateTime,
    pub published_on: Option<NaiveDateTime>,
    pub confirmed_requests: i32,
    pub views: i64,
}

impl Event {
    /// A fresh PENDING event; `event_date` must already be validated.
    pub fn new(
        initiator_id: Uuid,
        input: NewEventDto,
        event_date: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            annotation: input.annotation,
            description: input.description,
            category_id: input.category,
            initiator_id,
            location: input.location,
            paid: input.paid.unwrap_or(false),
            participant_limit: input.participant_limit.unwrap_or(0),
            request_moderation: input.request_moderation.unwrap_or(true),
            state: EventState::Pending,
            event_date,
            created_on: now,
            published_on: None,
            confirmed_requests: 0,
            views: 0,
        }
    }

    /// Whether another participant can be confirmed.
    pub fn has_capacity(&self) -> bool {
        self.participant_limit == 0 || self.confirmed_requests < self.participant_limit
    }
}

/// Body of `POST /users/{user_id}/events`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEventDto {
    #[validate(length(min = 20, max = 2000))]
    pub annotation: String,
    pub category: Uuid,
    #[validate(length(min = 20, max = 7000))]
    pub description: String,
    /// `yyyy-MM-dd HH:mm:ss`, at least two hours ahead
    #[schema(example = "2030-06-15 18:30:00")]
    pub event_date: String,
    pub location: Location,
    pub paid: Option<bool>,
    #[validate(range(min = 0))]
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    #[validate(length(min = 3, max = 120))]
    pub title: String,
}

/// Body of `PATCH /admin/events/{event_id}`; absent fields stay unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventAdminRequest {
    #[validate(length(min = 20, max = 2000))]
    pub annotation: Option<String>,
    pub category: Option<Uuid>,
    #[validate(length(min = 20, max = 7000))]
    pub description: Option<String>,
    #[schema(example = "2030-06-15 18:30:00")]
    pub event_date: Option<String>,
    pub location: Option<Location>,
    pub paid: Option<bool>,
    #[validate(range(min = 0))]
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    /// PUBLISH_EVENT or REJECT_EVENT; anything else is ignored
    #[schema(example = "PUBLISH_EVENT")]
    pub state_action: Option<String>,
    #[validate(length(min = 3, max = 120))]
    pub title: Option<String>,
}

/// Body of `PATCH /users/{user_id}/events/{event_id}`; absent fields stay unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventUserRequest {
    #[validate(length(min = 20, max = 2000))]
    pub annotation: Option<String>,
    pub category: Option<Uuid>,
    #[validate(length(min = 20, max = 7000))]
    pub description: Option<String>,
    #[schema(example = "2030-06-15 18:30:00")]
    pub event_date: Option<String>,
    pub location: Option<Location>,
    pub paid: Option<bool>,
    #[validate(range(min = 0))]
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    /// SEND_TO_REVIEW or CANCEL_REVIEW; anything else is ignored
    #[schema(example = "SEND_TO_REVIEW")]
    pub state_action: Option<String>,
    #[validate(length(min = 3, max = 120))]
    pub title: Option<String>,
}

/// Full representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventFullDto {
    pub id: Uuid,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category: Category,
    pub initiator: UserShortDto,
    pub location: Location,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    #[serde(with = "datetime::format")]
    #[schema(value_type = String, example = "2030-06-15 18:30:00")]
    pub event_date: NaiveDateTime,
    #[serde(with = "datetime::format")]
    #[schema(value_type = String)]
    pub created_on: NaiveDateTime,
    #[serde(with = "datetime::option_format", default)]
    #[schema(value_type = Option<String>)]
    pub published_on: Option<NaiveDateTime>,
    pub confirmed_requests: i32,
    pub views: i64,
    /// Average mark, absent until someone rates the event
    pub rating: Option<f64>,
}

impl EventFullDto {
    pub fn new(event: Event, category: Category, initiator: UserShortDto, rating: Option<f64>) -> Self {
        Self {
            id: event.id,
            title: event.title,
            annotation: event.annotation,
            description: event.description,
            category,
            initiator,
            location: event.location,
            paid: event.paid,
            participant_limit: event.participant_limit,
            request_moderation: event.request_moderation,
            state: event.state,
            event_date: event.event_date,
            created_on: event.created_on,
            published_on: event.published_on,
            confirmed_requests: event.confirmed_requests,
            views: event.views,
            rating,
        }
    }
}

/// Listing representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventShortDto {
    pub id: Uuid,
    pub title: String,
    pub annotation: String,
    pub category: Category,
    pub initiator: UserShortDto,
    #[serde(with = "datetime::format")]
    #[schema(value_type = String, example = "2030-06-15 18:30:00")]
    pub event_date: NaiveDateTime,
    pub paid: bool,
    pub confirmed_requests: i32,
    pub views: i64,
}

impl EventShortDto {
    pub fn new(event: Event, category: Category, initiator: UserShortDto) -> Self {
        Self {
            id: event.id,
            title: event.title,
            annotation: event.annotation,
            category,
            initiator,
            event_date: event.event_date,
            paid: event.paid,
            confirmed_requests: event.confirmed_requests,
            views: event.views,
        }
    }
}

/// Public listing order; unset keeps store order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSort {
    /// Soonest first
    EventDate,
    /// Most viewed first
    Views,
}

/// Query of `GET /admin/events`; repeat list keys for several values
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminEventQuery {
    /// Initiator ids
    #[serde(default)]
    pub users: Vec<Uuid>,
    /// PENDING, PUBLISHED or CANCELED
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    pub from: Option<u64>,
    pub size: Option<u64>,
}

/// Query of `GET /events`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PublicEventQuery {
    /// Case-insensitive substring of the annotation
    pub text: Option<String>,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    pub paid: Option<bool>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    /// Only events that still accept participants
    #[serde(default)]
    pub only_available: bool,
    /// EVENT_DATE or VIEWS
    pub sort: Option<String>,
    pub from: Option<u64>,
    pub size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_state_wire_names() {
        assert_eq!(serde_json::to_value(EventState::Published).unwrap(), "PUBLISHED");
        assert_eq!(EventState::from_str("CANCELED").unwrap(), EventState::Canceled);
        assert!(EventState::from_str("DRAFT").is_err());
    }

    #[test]
    fn test_action_vocabularies_are_disjoint() {
        assert!(AdminStateAction::from_str("PUBLISH_EVENT").is_ok());
        assert!(AdminStateAction::from_str("SEND_TO_REVIEW").is_err());
        assert!(UserStateAction::from_str("CANCEL_REVIEW").is_ok());
        assert!(UserStateAction::from_str("REJECT_EVENT").is_err());
    }

    #[test]
    fn test_sort_keys() {
        assert_eq!(EventSort::from_str("EVENT_DATE").unwrap(), EventSort::EventDate);
        assert_eq!(EventSort::from_str("VIEWS").unwrap(), EventSort::Views);
        assert!(EventSort::from_str("RATING").is_err());
    }

    #[test]
    fn test_new_event_defaults() {
        let input: NewEventDto = serde_json::from_value(serde_json::json!({
            "annotation": "An annotation long enough",
            "category": Uuid::nil(),
            "description": "A description long enough",
            "eventDate": "2030-06-15 18:30:00",
            "location": {"lat": 55.75, "lon": 37.61},
            "title": "Meetup"
        }))
        .unwrap();
        assert!(input.validate().is_ok());

        let now = axum_helpers::datetime::now();
        let event = Event::new(Uuid::nil(), input, now, now);
        assert_eq!(event.state, EventState::Pending);
        assert!(!event.paid);
        assert!(event.request_moderation);
        assert_eq!(event.participant_limit, 0);
        assert!(event.has_capacity());
    }

    #[test]
    fn test_negative_limit_is_invalid() {
        let patch = UpdateEventUserRequest {
            participant_limit: Some(-1),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
