//! Capacity-aware confirmation and rejection of pending requests.

use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::models::Event;
use crate::requests::{ParticipationRequest, RequestStatus};

/// Which requests of a batch ended up confirmed and which rejected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModerationOutcome {
    pub confirmed: Vec<ParticipationRequest>,
    pub rejected: Vec<ParticipationRequest>,
}

/// Arrange `found` in the order of `ids`, dropping repeated ids.
///
/// Every id must name a request of `event_id`.
pub fn order_batch(
    ids: &[Uuid],
    found: Vec<ParticipationRequest>,
    event_id: Uuid,
) -> EventResult<Vec<ParticipationRequest>> {
    let mut seen = HashSet::new();
    let mut batch = Vec::with_capacity(ids.len());

    for id in ids {
        if !seen.insert(*id) {
            continue;
        }
        let request = found
            .iter()
            .find(|r| r.id == *id && r.event_id == event_id)
            .cloned()
            .ok_or(EventError::RequestNotFound(*id))?;
        batch.push(request);
    }

    Ok(batch)
}

/// Set every request in `batch` to `desired`, in order.
///
/// Confirming stops at the event's limit: once it is reached the remaining
/// requests are rejected instead. The whole batch is refused unless every
/// request is still PENDING.
pub fn moderate(
    event: &mut Event,
    batch: &mut [ParticipationRequest],
    desired: RequestStatus,
) -> EventResult<ModerationOutcome> {
    if !matches!(desired, RequestStatus::Confirmed | RequestStatus::Rejected) {
        return Err(EventError::InvalidArgument(format!(
            "Requests can only be CONFIRMED or REJECTED, not {}",
            desired
        )));
    }
    if batch.iter().any(|r| r.status != RequestStatus::Pending) {
        return Err(EventError::InvalidArgument(
            "Request must have status PENDING".to_string(),
        ));
    }

    let mut outcome = ModerationOutcome::default();

    for request in batch.iter_mut() {
        if desired == RequestStatus::Confirmed && event.has_capacity() {
            request.status = RequestStatus::Confirmed;
            event.confirmed_requests += 1;
            outcome.confirmed.push(request.clone());
        } else {
            request.status = RequestStatus::Rejected;
            outcome.rejected.push(request.clone());
        }
    }

    Ok(outcome)
}
