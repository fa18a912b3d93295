//! Shared application state.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::supabase::SupabaseClient;

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    supabase: SupabaseClient,
}

impl AppState {
    /// Build the application state from configuration.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let supabase = SupabaseClient::new(&config.supabase);

        Self {
            inner: Arc::new(AppStateInner { config, supabase }),
        }
    }

    /// Access the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Access the backend API client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }
}
