//! Compilations Domain
//!
//! Admin-curated lists of events shown on the front page. A compilation keeps
//! its events in the order they were given.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_compilations::{handlers, CompilationService, InMemoryCompilationRepository};
//!
//! let service = CompilationService::new(InMemoryCompilationRepository::new(), event_lookup);
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CompilationError, CompilationResult};
pub use models::{
    Compilation, CompilationDto, CompilationQuery, NewCompilationDto, UpdateCompilationRequest,
};
pub use postgres::PgCompilationRepository;
pub use repository::{CompilationRepository, InMemoryCompilationRepository};
pub use service::CompilationService;
