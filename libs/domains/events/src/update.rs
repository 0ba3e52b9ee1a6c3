//! Partial event updates from the admin and from the initiator.

use axum_helpers::parse_date_time;
use chrono::NaiveDateTime;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::models::{
    AdminStateAction, Event, EventState, Location, UpdateEventAdminRequest,
    UpdateEventUserRequest, UserStateAction,
};

/// Who is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin,
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    Admin(AdminStateAction),
    User(UserStateAction),
}

/// An update as stored: the event after the patch, and the state it had before.
#[derive(Debug, Clone)]
pub struct AppliedUpdate {
    pub previous: EventState,
    pub event: Event,
}

/// A parsed update; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePatch {
    pub annotation: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDateTime>,
    pub location: Option<Location>,
    pub paid: Option<bool>,
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    pub title: Option<String>,
    pub action: Option<StateAction>,
}

fn parse_event_date(raw: Option<&str>) -> EventResult<Option<NaiveDateTime>> {
    raw.map(|raw| {
        parse_date_time(raw)
            .map_err(|e| EventError::InvalidArgument(format!("eventDate is malformed: {}", e)))
    })
    .transpose()
}

impl UpdatePatch {
    /// Unknown state actions are ignored.
    pub fn from_admin(request: UpdateEventAdminRequest) -> EventResult<Self> {
        Ok(Self {
            event_date: parse_event_date(request.event_date.as_deref())?,
            action: request
                .state_action
                .as_deref()
                .and_then(|a| AdminStateAction::from_str(a).ok())
                .map(StateAction::Admin),
            annotation: request.annotation,
            category_id: request.category,
            description: request.description,
            location: request.location,
            paid: request.paid,
            participant_limit: request.participant_limit,
            request_moderation: request.request_moderation,
            title: request.title,
        })
    }

    /// Unknown state actions are ignored.
    pub fn from_owner(request: UpdateEventUserRequest) -> EventResult<Self> {
        Ok(Self {
            event_date: parse_event_date(request.event_date.as_deref())?,
            action: request
                .state_action
                .as_deref()
                .and_then(|a| UserStateAction::from_str(a).ok())
                .map(StateAction::User),
            annotation: request.annotation,
            category_id: request.category,
            description: request.description,
            location: request.location,
            paid: request.paid,
            participant_limit: request.participant_limit,
            request_moderation: request.request_moderation,
            title: request.title,
        })
    }
}

/// Initiators may only edit events that are not published.
pub fn ensure_owner_may_edit(event: &Event) -> EventResult<()> {
    if event.state == EventState::Published {
        return Err(EventError::IllegalOperation(
            "Only pending or canceled events can be changed".to_string(),
        ));
    }
    Ok(())
}

/// Apply `patch` to `event` on behalf of `actor`.
///
/// State rules are checked before anything is written, so a refused update
/// leaves the event untouched. Field-level checks (category existence, the
/// two-hour lead time) are the caller's.
pub fn apply_update(
    event: &mut Event,
    patch: UpdatePatch,
    actor: Actor,
    now: NaiveDateTime,
) -> EventResult<()> {
    if actor == Actor::Owner {
        ensure_owner_may_edit(event)?;
    }

    let next_state = match patch.action {
        Some(StateAction::Admin(AdminStateAction::PublishEvent)) => {
            if event.state != EventState::Pending {
                return Err(EventError::IllegalOperation(format!(
                    "Cannot publish the event because it's not in the right state: {}",
                    event.state
                )));
            }
            Some(EventState::Published)
        }
        Some(StateAction::Admin(AdminStateAction::RejectEvent)) => Some(EventState::Canceled),
        Some(StateAction::User(UserStateAction::SendToReview)) => Some(EventState::Pending),
        Some(StateAction::User(UserStateAction::CancelReview)) => Some(EventState::Canceled),
        None => None,
    };

    let confirmed = event.confirmed_requests;
    if let Some(limit) = patch
        .participant_limit
        .filter(|&limit| limit > 0 && limit < confirmed)
    {
        return Err(EventError::IllegalOperation(format!(
            "participantLimit {} is below the {} already confirmed requests",
            limit, event.confirmed_requests
        )));
    }

    if let Some(annotation) = patch.annotation {
        event.annotation = annotation;
    }
    if let Some(category_id) = patch.category_id {
        event.category_id = category_id;
    }
    if let Some(description) = patch.description {
        event.description = description;
    }
    if let Some(event_date) = patch.event_date {
        event.event_date = event_date;
    }
    if let Some(location) = patch.location {
        event.location = location;
    }
    if let Some(paid) = patch.paid {
        event.paid = paid;
    }
    if let Some(limit) = patch.participant_limit {
        event.participant_limit = limit;
    }
    if let Some(moderation) = patch.request_moderation {
        event.request_moderation = moderation;
    }
    if let Some(title) = patch.title {
        event.title = title;
    }

    if let Some(state) = next_state {
        if state == EventState::Published {
            event.published_on = Some(now);
        }
        event.state = state;
    }

    Ok(())
}
