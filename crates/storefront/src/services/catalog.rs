//! Catalog loader.
//!
//! Fetches the category and product lists and exposes them as read-only
//! collections. A load is all-or-nothing: if either fetch fails the whole
//! load fails and the caller renders an empty catalog with a retry
//! affordance, never a partial or stale one. A successful load replaces
//! whatever was rendered before, wholesale.

use freshmart_core::{Category, Product};

use crate::supabase::{SupabaseClient, SupabaseError};

/// Store operations the catalog loader needs.
pub trait CatalogStore {
    /// Fetch all categories, sorted by name.
    fn list_categories(
        &self,
    ) -> impl Future<Output = Result<Vec<Category>, SupabaseError>> + Send;

    /// Fetch all products, sorted by name, annotated with category names.
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, SupabaseError>> + Send;
}

impl CatalogStore for SupabaseClient {
    async fn list_categories(&self) -> Result<Vec<Category>, SupabaseError> {
        Self::list_categories(self).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, SupabaseError> {
        Self::list_products(self).await
    }
}

/// A loaded catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

/// The catalog loader service.
pub struct CatalogService<S> {
    store: S,
}

impl<S: CatalogStore> CatalogService<S> {
    /// Create a new catalog service over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load categories and products.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error; no partial catalog is ever returned.
    pub async fn load(&self) -> Result<Catalog, SupabaseError> {
        let categories = self.store.list_categories().await?;
        let products = self.store.list_products().await?;

        Ok(Catalog {
            categories,
            products,
        })
    }
}
