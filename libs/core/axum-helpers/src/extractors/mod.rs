//! Custom extractors for Axum handlers.
//!
//! Every rejection renders through [`AppError`](crate::errors::AppError), so
//! malformed input produces the same JSON error body as a domain failure.

pub mod pagination;
pub mod query;
pub mod request_meta;
pub mod uuid_path;
pub mod validated_json;

pub use pagination::{Page, PageParams};
pub use query::QueryParams;
pub use request_meta::RequestMeta;
pub use uuid_path::{UuidPath, UuidPathPair};
pub use validated_json::ValidatedJson;
