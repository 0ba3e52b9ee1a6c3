//! Categories Domain
//!
//! Reference data every event is filed under. Admins manage the list, anyone
//! may read it.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_categories::{handlers, InMemoryCategoryRepository, CategoryService};
//!
//! let service = CategoryService::new(InMemoryCategoryRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CategoryError, CategoryResult};
pub use models::{Category, CategoryDto, NewCategory};
pub use postgres::PgCategoryRepository;
pub use repository::{CategoryRepository, CategoryUsage, InMemoryCategoryRepository};
pub use service::CategoryService;
