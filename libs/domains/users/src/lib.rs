//! Users Domain
//!
//! Admin-managed user accounts. Users initiate events, request participation
//! and rate events; this crate only owns the account records.

pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use models::{NewUserRequest, User, UserFilter, UserShortDto};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
