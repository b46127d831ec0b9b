//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, and pagination.

mod auth;
mod pagination;
mod path;
mod validated;

pub use auth::AuthUser;
pub use pagination::Pagination;
pub use path::{ShortnamePath, SnowflakePath};
pub use validated::{OptionalValidatedJson, ValidatedJson};
