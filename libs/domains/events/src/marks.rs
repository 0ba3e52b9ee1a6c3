//! Marks: a participant's 1..=10 score for an event they attended.

use axum_helpers::datetime;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub score: i16,
    pub message: Option<String>,
    pub marked_on: NaiveDateTime,
}

impl Mark {
    pub fn new(event_id: Uuid, user_id: Uuid, input: NewMarkDto, now: NaiveDateTime) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_id,
            user_id,
            score: input.mark,
            message: input.message,
            marked_on: now,
        }
    }
}

/// Body of `POST /users/{user_id}/events/{event_id}/marks`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct NewMarkDto {
    #[validate(range(min = 1, max = 10))]
    #[schema(minimum = 1, maximum = 10, example = 8)]
    pub mark: i16,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub mark: i16,
    #[serde(with = "datetime::format")]
    #[schema(value_type = String, example = "2030-06-16 10:00:00")]
    pub marked_on: NaiveDateTime,
    pub message: Option<String>,
}

impl From<Mark> for MarkDto {
    fn from(mark: Mark) -> Self {
        Self {
            id: mark.id,
            user_id: mark.user_id,
            event_id: mark.event_id,
            mark: mark.score,
            marked_on: mark.marked_on,
            message: mark.message,
        }
    }
}

/// Checks that `user_id` may rate `event`: it must be published, the user must
/// hold a confirmed seat, and must not have rated it before.
pub fn check_can_mark(
    event: &Event,
    has_confirmed_request: bool,
    already_marked: bool,
) -> EventResult<()> {
    if event.state != EventState::Published {
        return Err(EventError::IllegalOperation(
            "Only published events can be rated".to_string(),
        ));
    }
    if !has_confirmed_request {
        return Err(EventError::IllegalOperation(
            "Only confirmed participants can rate an event".to_string(),
        ));
    }
    if already_marked {
        return Err(EventError::IllegalOperation(
            "The event has already been rated by this user".to_string(),
        ));
    }
    Ok(())
}

/// Average score per event, for the events that have at least one mark.
pub fn average_scores<'a>(
    marks: impl IntoIterator<Item = &'a Mark>,
) -> std::collections::HashMap<Uuid, f64> {
    let mut sums: std::collections::HashMap<Uuid, (i64, i64)> = std::collections::HashMap::new();
    for mark in marks {
        let entry = sums.entry(mark.event_id).or_default();
        entry.0 += i64::from(mark.score);
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(id, (sum, count))| (id, sum as f64 / count as f64))
        .collect()
}
