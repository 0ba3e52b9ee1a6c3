//! Stats Domain
//!
//! Append-only log of endpoint hits and the aggregation served from it:
//! per-uri hit counts inside a time window, optionally counting distinct IPs.
//!
//! [`client`] is the other side of the wire: the event service uses
//! [`HttpStatsClient`] to report hits without waiting on the outcome.

pub mod aggregate;
pub mod client;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use client::{HttpStatsClient, StatsClient};
pub use error::{StatsError, StatsResult};
pub use models::{EndpointHit, NewEndpointHit, StatsQuery, StatsWindow, ViewStats};
pub use postgres::PgStatsRepository;
pub use repository::{InMemoryStatsRepository, StatsRepository};
pub use service::StatsService;
