//! Application services.
//!
//! Each service owns one slice of behavior and talks to the backend through
//! a narrow store trait implemented by `SupabaseClient`. The traits exist so
//! unit tests can substitute in-memory doubles for the remote backend.

pub mod admin;
pub mod auth;
pub mod catalog;

pub use admin::{AdminCatalogService, AdminError};
pub use auth::{AuthError, AuthGateway};
pub use catalog::{Catalog, CatalogService};
