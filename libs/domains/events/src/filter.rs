//! Event search filters.
//!
//! Query parameters are parsed once into an [`EventFilter`], a conjunction of
//! [`EventPredicate`]s. Each predicate knows how to test an in-memory
//! [`Event`] and how to render itself as a SQL condition, so both repositories
//! share one set of search semantics.

use axum_helpers::parse_date_time;
use chrono::NaiveDateTime;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{ColumnTrait, Condition, ExprTrait};
use std::str::FromStr;
use uuid::Uuid;

use crate::entity::event::Column;
use crate::error::{EventError, EventResult};
use crate::models::{AdminEventQuery, Event, EventSort, EventState, PublicEventQuery};

#[derive(Debug, Clone, PartialEq)]
pub enum EventPredicate {
    Initiators(Vec<Uuid>),
    States(Vec<EventState>),
    Categories(Vec<Uuid>),
    /// `event_date >= t`
    DateFrom(NaiveDateTime),
    /// `event_date <= t`
    DateTo(NaiveDateTime),
    /// `event_date > t`
    After(NaiveDateTime),
    /// Case-insensitive substring of the annotation
    Text(String),
    Paid(bool),
    /// Nothing confirmed yet, or confirmed below the limit
    OnlyAvailable,
}

impl EventPredicate {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::Initiators(ids) => ids.contains(&event.initiator_id),
            Self::States(states) => states.contains(&event.state),
            Self::Categories(ids) => ids.contains(&event.category_id),
            Self::DateFrom(t) => event.event_date >= *t,
            Self::DateTo(t) => event.event_date <= *t,
            Self::After(t) => event.event_date > *t,
            Self::Text(text) => event
                .annotation
                .to_lowercase()
                .contains(&text.to_lowercase()),
            Self::Paid(paid) => event.paid == *paid,
            Self::OnlyAvailable => {
                event.confirmed_requests == 0
                    || event.confirmed_requests < event.participant_limit
            }
        }
    }

    pub fn to_condition(&self) -> Condition {
        match self {
            Self::Initiators(ids) => Condition::all().add(Column::InitiatorId.is_in(ids.clone())),
            Self::States(states) => Condition::all().add(Column::State.is_in(states.clone())),
            Self::Categories(ids) => Condition::all().add(Column::CategoryId.is_in(ids.clone())),
            Self::DateFrom(t) => Condition::all().add(Column::EventDate.gte(*t)),
            Self::DateTo(t) => Condition::all().add(Column::EventDate.lte(*t)),
            Self::After(t) => Condition::all().add(Column::EventDate.gt(*t)),
            Self::Text(text) => {
                let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
                Condition::all().add(
                    Expr::expr(Func::lower(Expr::col(Column::Annotation)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                )
            }
            Self::Paid(paid) => Condition::all().add(Column::Paid.eq(*paid)),
            Self::OnlyAvailable => Condition::any()
                .add(Column::ConfirmedRequests.eq(0))
                .add(
                    Expr::col(Column::ConfirmedRequests).lt(Expr::col(Column::ParticipantLimit)),
                ),
        }
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Conjunction of predicates; empty matches everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub predicates: Vec<EventPredicate>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: EventPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.predicates.iter().all(|p| p.matches(event))
    }

    pub fn to_condition(&self) -> Condition {
        self.predicates
            .iter()
            .fold(Condition::all(), |cond, p| cond.add(p.to_condition()))
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> EventResult<Option<NaiveDateTime>> {
    value
        .map(|raw| {
            parse_date_time(raw)
                .map_err(|e| EventError::InvalidArgument(format!("{} is malformed: {}", name, e)))
        })
        .transpose()
}

/// Filter for `GET /admin/events`. Every parameter is optional; lists match
/// any of their values.
pub fn admin_filter(query: &AdminEventQuery) -> EventResult<EventFilter> {
    let mut filter = EventFilter::new();

    if !query.users.is_empty() {
        filter = filter.with(EventPredicate::Initiators(query.users.clone()));
    }
    if !query.states.is_empty() {
        let states = query
            .states
            .iter()
            .map(|s| {
                EventState::from_str(s)
                    .map_err(|_| EventError::InvalidArgument(format!("Unknown state: {}", s)))
            })
            .collect::<EventResult<Vec<_>>>()?;
        filter = filter.with(EventPredicate::States(states));
    }
    if !query.categories.is_empty() {
        filter = filter.with(EventPredicate::Categories(query.categories.clone()));
    }
    if let Some(start) = parse_bound("rangeStart", query.range_start.as_deref())? {
        filter = filter.with(EventPredicate::DateFrom(start));
    }
    if let Some(end) = parse_bound("rangeEnd", query.range_end.as_deref())? {
        filter = filter.with(EventPredicate::DateTo(end));
    }

    Ok(filter)
}

/// Filter for `GET /events`: published events only, and upcoming ones when
/// no date range is given.
pub fn public_filter(query: &PublicEventQuery, now: NaiveDateTime) -> EventResult<EventFilter> {
    let mut filter = EventFilter::new().with(EventPredicate::States(vec![EventState::Published]));

    if let Some(text) = query.text.as_deref().filter(|t| !t.is_empty()) {
        filter = filter.with(EventPredicate::Text(text.to_string()));
    }
    if !query.categories.is_empty() {
        filter = filter.with(EventPredicate::Categories(query.categories.clone()));
    }
    if let Some(paid) = query.paid {
        filter = filter.with(EventPredicate::Paid(paid));
    }

    let start = parse_bound("rangeStart", query.range_start.as_deref())?;
    let end = parse_bound("rangeEnd", query.range_end.as_deref())?;
    match (start, end) {
        (Some(start), Some(end)) if start > end => {
            return Err(EventError::InvalidArgument(
                "rangeStart must not be after rangeEnd".to_string(),
            ));
        }
        (None, None) => filter = filter.with(EventPredicate::After(now)),
        (start, end) => {
            if let Some(start) = start {
                filter = filter.with(EventPredicate::DateFrom(start));
            }
            if let Some(end) = end {
                filter = filter.with(EventPredicate::DateTo(end));
            }
        }
    }

    if query.only_available {
        filter = filter.with(EventPredicate::OnlyAvailable);
    }

    Ok(filter)
}

/// `None` keeps store order; unknown keys are rejected.
pub fn parse_sort(sort: Option<&str>) -> EventResult<Option<EventSort>> {
    sort.map(|s| {
        EventSort::from_str(s)
            .map_err(|_| EventError::InvalidArgument(format!("Unknown sort: {}", s)))
    })
    .transpose()
}

/// Orders an in-memory result the way the SQL repository does.
pub fn sort_events(events: &mut [Event], sort: Option<EventSort>) {
    match sort {
        Some(EventSort::EventDate) => events.sort_by(|a, b| a.event_date.cmp(&b.event_date).then(a.id.cmp(&b.id))),
        Some(EventSort::Views) => events.sort_by(|a, b| b.views.cmp(&a.views).then(a.id.cmp(&b.id))),
        None => events.sort_by_key(|e| e.id),
    }
}
