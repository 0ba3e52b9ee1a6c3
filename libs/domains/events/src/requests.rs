//! Participation requests: what a user files to join an event, and the rules
//! for filing and withdrawing one.

use axum_helpers::datetime;
use chrono::NaiveDateTime;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventState};

/// Request lifecycle; only PENDING is not terminal
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
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipationRequest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub requester_id: Uuid,
    pub status: RequestStatus,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParticipationRequestDto {
    pub id: Uuid,
    pub event: Uuid,
    pub requester: Uuid,
    pub status: RequestStatus,
    #[serde(with = "datetime::format")]
    #[schema(value_type = String, example = "2030-06-15 18:30:00")]
    pub created: NaiveDateTime,
}

impl From<ParticipationRequest> for ParticipationRequestDto {
    fn from(request: ParticipationRequest) -> Self {
        Self {
            id: request.id,
            event: request.event_id,
            requester: request.requester_id,
            status: request.status,
            created: request.created,
        }
    }
}

/// Body of `PATCH /users/{user_id}/events/{event_id}/requests`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventRequestStatusUpdateRequest {
    /// Processed in this order
    pub request_ids: Vec<Uuid>,
    /// CONFIRMED or REJECTED
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRequestStatusUpdateResult {
    pub confirmed_requests: Vec<ParticipationRequestDto>,
    pub rejected_requests: Vec<ParticipationRequestDto>,
}

/// Query of `POST /users/{user_id}/requests`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NewRequestQuery {
    pub event_id: Uuid,
}

/// File a request from `requester_id` for `event`.
///
/// Runs under the event's lock. Without moderation, or with an unlimited
/// event, the request is confirmed on the spot and the event's counter moves.
pub fn admit(
    event: &mut Event,
    requester_id: Uuid,
    already_requested: bool,
    now: NaiveDateTime,
) -> EventResult<ParticipationRequest> {
    if event.initiator_id == requester_id {
        return Err(EventError::IllegalOperation(
            "The initiator cannot request participation in their own event".to_string(),
        ));
    }
    if event.state != EventState::Published {
        return Err(EventError::IllegalOperation(
            "Cannot participate in an unpublished event".to_string(),
        ));
    }
    if already_requested {
        return Err(EventError::IllegalOperation(
            "Participation has already been requested".to_string(),
        ));
    }
    if !event.has_capacity() {
        return Err(EventError::IllegalOperation(
            "The participant limit has been reached".to_string(),
        ));
    }

    let status = if !event.request_moderation || event.participant_limit == 0 {
        event.confirmed_requests += 1;
        RequestStatus::Confirmed
    } else {
        RequestStatus::Pending
    };

    Ok(ParticipationRequest {
        id: Uuid::now_v7(),
        event_id: event.id,
        requester_id,
        status,
        created: now,
    })
}

/// Withdraw `request` on behalf of `requester_id`, releasing its seat if it
/// held one. Only PENDING and CONFIRMED requests can be withdrawn.
pub fn withdraw(
    event: &mut Event,
    request: &mut ParticipationRequest,
    requester_id: Uuid,
) -> EventResult<()> {
    if request.requester_id != requester_id {
        return Err(EventError::RequestNotFound(request.id));
    }

    match request.status {
        RequestStatus::Pending => {}
        RequestStatus::Confirmed => {
            event.confirmed_requests = (event.confirmed_requests - 1).max(0);
        }
        RequestStatus::Rejected | RequestStatus::Canceled => {
            return Err(EventError::IllegalOperation(format!(
                "Request is already {}",
                request.status
            )));
        }
    }

    request.status = RequestStatus::Canceled;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn published_event(limit: i32, moderation: bool) -> Event {
        let now = axum_helpers::datetime::now();
        Event {
            id: Uuid::now_v7(),
            title: "Meetup".into(),
            annotation: "An annotation long enough".into(),
            description: "A description long enough".into(),
            category_id: Uuid::now_v7(),
            initiator_id: Uuid::now_v7(),
            location: Location { lat: 0.0, lon: 0.0 },
            paid: false,
            participant_limit: limit,
            request_moderation: moderation,
            state: EventState::Published,
            event_date: now,
            created_on: now,
            published_on: Some(now),
            confirmed_requests: 0,
            views: 0,
        }
    }

    fn now() -> NaiveDateTime {
        axum_helpers::datetime::now()
    }

    #[test]
    fn test_moderated_event_gets_pending_request() {
        let mut event = published_event(10, true);
        let request = admit(&mut event, Uuid::now_v7(), false, now()).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(event.confirmed_requests, 0);
    }

    #[test]
    fn test_unmoderated_or_unlimited_event_confirms_immediately() {
        let mut unmoderated = published_event(10, false);
        let request = admit(&mut unmoderated, Uuid::now_v7(), false, now()).unwrap();
        assert_eq!(request.status, RequestStatus::Confirmed);
        assert_eq!(unmoderated.confirmed_requests, 1);

        let mut unlimited = published_event(0, true);
        let request = admit(&mut unlimited, Uuid::now_v7(), false, now()).unwrap();
        assert_eq!(request.status, RequestStatus::Confirmed);
    }

    #[test]
    fn test_initiator_cannot_request_own_event() {
        let mut event = published_event(10, true);
        let initiator = event.initiator_id;
        let err = admit(&mut event, initiator, false, now()).unwrap_err();
        assert!(matches!(err, EventError::IllegalOperation(_)));
    }

    #[test]
    fn test_unpublished_full_and_duplicate_are_refused() {
        let mut pending = published_event(10, true);
        pending.state = EventState::Pending;
        assert!(admit(&mut pending, Uuid::now_v7(), false, now()).is_err());

        let mut full = published_event(1, true);
        full.confirmed_requests = 1;
        assert!(admit(&mut full, Uuid::now_v7(), false, now()).is_err());

        let mut event = published_event(10, true);
        assert!(admit(&mut event, Uuid::now_v7(), true, now()).is_err());
    }

    #[test]
    fn test_withdrawing_confirmed_request_frees_a_seat() {
        let mut event = published_event(10, false);
        let requester = Uuid::now_v7();
        let mut request = admit(&mut event, requester, false, now()).unwrap();

        withdraw(&mut event, &mut request, requester).unwrap();
        assert_eq!(request.status, RequestStatus::Canceled);
        assert_eq!(event.confirmed_requests, 0);

        let err = withdraw(&mut event, &mut request, requester).unwrap_err();
        assert!(matches!(err, EventError::IllegalOperation(_)));
    }

    #[test]
    fn test_only_requester_may_withdraw() {
        let mut event = published_event(10, true);
        let mut request = admit(&mut event, Uuid::now_v7(), false, now()).unwrap();
        let err = withdraw(&mut event, &mut request, Uuid::now_v7()).unwrap_err();
        assert!(matches!(err, EventError::RequestNotFound(_)));
    }
}
