//! Backend-as-a-service client (Supabase-style).
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local sync, direct API calls
//! - Records (products, categories, profiles) via the PostgREST endpoint
//! - Sessions via the GoTrue password endpoints
//! - Product images via the Storage endpoint
//! - One `SupabaseClient` is built at startup and injected through
//!   `AppState`; it is cheap to clone (`Arc` inner)
//!
//! Row-level security is enforced remotely: requests carry the signed-in
//! user's access token where one exists, otherwise the public anon key.
//!
//! # Example
//!
//! ```rust,ignore
//! use freshmart_storefront::supabase::SupabaseClient;
//!
//! let client = SupabaseClient::new(&config.supabase);
//!
//! // Load the catalog
//! let categories = client.list_categories().await?;
//! let products = client.list_products().await?;
//! ```

mod client;
pub mod types;

pub use client::SupabaseClient;

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed (network, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// The storage bucket targeted by an upload does not exist.
    ///
    /// Kept distinct from [`SupabaseError::Api`] so the admin UI can give
    /// actionable guidance instead of a generic failure.
    #[error("storage bucket \"{0}\" not found")]
    BucketNotFound(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SupabaseError {
    /// Whether this error is an authentication failure (401/400 from the
    /// session endpoints, 401/403 from RLS-guarded record endpoints).
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Api {
                status: 400 | 401 | 403,
                ..
            }
        )
    }
}
