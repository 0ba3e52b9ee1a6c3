//! Events Domain
//!
//! The event lifecycle and everything hanging off it:
//!
//! - [`filter`] turns admin and public search parameters into one conjunctive
//!   predicate, evaluated in memory or rendered as SQL.
//! - [`update`] applies partial edits with actor-scoped state transitions.
//! - [`moderation`] confirms or rejects a batch of pending participation
//!   requests against the event's capacity.
//! - [`requests`] and [`marks`] cover filing requests and rating attended events.
//!
//! [`EventService`] ties these to the repository, resolves categories and
//! initiators, and reports public reads to the stats service.

pub mod entity;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod marks;
pub mod models;
pub mod moderation;
pub mod postgres;
pub mod repository;
pub mod requests;
pub mod service;
pub mod update;

pub use error::{EventError, EventResult};
pub use marks::{Mark, MarkDto, NewMarkDto};
pub use models::{
    AdminEventQuery, Event, EventFullDto, EventShortDto, EventSort, EventState, Location,
    NewEventDto, PublicEventQuery, UpdateEventAdminRequest, UpdateEventUserRequest,
};
pub use postgres::PgEventRepository;
pub use repository::{EventRepository, InMemoryEventRepository};
pub use requests::{
    EventRequestStatusUpdateRequest, EventRequestStatusUpdateResult, ParticipationRequest,
    ParticipationRequestDto, RequestStatus,
};
pub use service::{EventLookup, EventService};
