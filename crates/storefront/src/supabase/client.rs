//! Backend client implementation.
//!
//! Thin REST wrapper over the backend's record (PostgREST), session
//! (GoTrue), and storage endpoints using `reqwest`. Requests carry the anon
//! key, plus the user's bearer token where one exists so row-level security
//! applies to the caller, not the server.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use tracing::instrument;

use freshmart_core::{Category, Product, ProductId, UserId};

use crate::config::SupabaseConfig;
use crate::supabase::SupabaseError;
use crate::supabase::types::{
    ApiErrorBody, AuthSession, CategoryRow, NewProductRecord, ProductRecordUpdate, ProductRow,
    ProfileRow,
};

/// Select clause that embeds each product's category display name.
const PRODUCT_SELECT: &str = "*,categories(name)";

// =============================================================================
// SupabaseClient
// =============================================================================

/// Client for the remote backend.
///
/// Provides typed access to catalog records, sessions, and image storage.
/// Cheap to clone; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    /// Project base URL without a trailing slash.
    base_url: String,
    anon_key: String,
    product_images_bucket: String,
}

impl SupabaseClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        let base_url = config.url.as_str().trim_end_matches('/').to_string();

        Self {
            inner: Arc::new(SupabaseClientInner {
                http: reqwest::Client::new(),
                base_url,
                anon_key: config.anon_key.expose_secret().to_string(),
                product_images_bucket: config.product_images_bucket.clone(),
            }),
        }
    }

    /// The storage bucket product images are uploaded to.
    #[must_use]
    pub fn product_images_bucket(&self) -> &str {
        &self.inner.product_images_bucket
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn bearer(&self, access_token: Option<&str>) -> String {
        format!(
            "Bearer {}",
            access_token.unwrap_or(&self.inner.anon_key)
        )
    }

    /// Map a non-success response into [`SupabaseError::Api`].
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(ApiErrorBody::into_message)
            .unwrap_or_else(|| body.chars().take(200).collect());

        tracing::warn!(
            status = %status,
            message = %message,
            "Backend returned non-success status"
        );

        Err(SupabaseError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Ping the backend's auth health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), SupabaseError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("/auth/v1/health"))
            .header("apikey", &self.inner.anon_key)
            .send()
            .await?;

        Self::check(response).await.map(|_| ())
    }

    // =========================================================================
    // Catalog Records
    // =========================================================================

    /// Fetch all categories, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, SupabaseError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("/rest/v1/categories"))
            .query(&[("select", "*"), ("order", "name.asc")])
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(None))
            .send()
            .await?;

        let rows: Vec<CategoryRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Fetch all products, sorted by name, each annotated with its
    /// category's display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, SupabaseError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("/rest/v1/products"))
            .query(&[("select", PRODUCT_SELECT), ("order", "name.asc")])
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(None))
            .send()
            .await?;

        let rows: Vec<ProductRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Fetch the signed-in user's own products, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, access_token))]
    pub async fn list_products_for_user(
        &self,
        access_token: &str,
        user_id: UserId,
    ) -> Result<Vec<Product>, SupabaseError> {
        let owner_filter = format!("eq.{user_id}");
        let response = self
            .inner
            .http
            .get(self.endpoint("/rest/v1/products"))
            .query(&[
                ("select", PRODUCT_SELECT),
                ("order", "name.asc"),
                ("user_id", owner_filter.as_str()),
            ])
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(Some(access_token)))
            .send()
            .await?;

        let rows: Vec<ProductRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Insert a product record and return the created row.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the insert.
    #[instrument(skip(self, access_token, record), fields(product = %record.name))]
    pub async fn insert_product(
        &self,
        access_token: &str,
        record: &NewProductRecord,
    ) -> Result<Product, SupabaseError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("/rest/v1/products"))
            .query(&[("select", PRODUCT_SELECT)])
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(Some(access_token)))
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await?;

        let rows: Vec<ProductRow> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .map(Product::from)
            .ok_or_else(|| SupabaseError::Api {
                status: 500,
                message: "insert returned no rows".to_string(),
            })
    }

    /// Replace the product record with `id` and return the updated row.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or no row matched.
    #[instrument(skip(self, access_token, record))]
    pub async fn update_product(
        &self,
        access_token: &str,
        id: ProductId,
        record: &ProductRecordUpdate,
    ) -> Result<Product, SupabaseError> {
        let response = self
            .inner
            .http
            .patch(self.endpoint("/rest/v1/products"))
            .query(&[
                ("select", PRODUCT_SELECT),
                ("id", format!("eq.{id}").as_str()),
            ])
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(Some(access_token)))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;

        let rows: Vec<ProductRow> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .map(Product::from)
            .ok_or_else(|| SupabaseError::Api {
                status: 404,
                message: format!("no product with id {id}"),
            })
    }

    /// Delete the product record with `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    #[instrument(skip(self, access_token))]
    pub async fn delete_product(
        &self,
        access_token: &str,
        id: ProductId,
    ) -> Result<(), SupabaseError> {
        let response = self
            .inner
            .http
            .delete(self.endpoint("/rest/v1/products"))
            .query(&[("id", &format!("eq.{id}"))])
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(Some(access_token)))
            .send()
            .await?;

        Self::check(response).await.map(|_| ())
    }

    /// Fetch the profile row for `user_id`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, access_token))]
    pub async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: UserId,
    ) -> Result<Option<ProfileRow>, SupabaseError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("/rest/v1/profiles"))
            .query(&[
                ("select", "is_admin"),
                ("id", format!("eq.{user_id}").as_str()),
            ])
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(Some(access_token)))
            .send()
            .await?;

        let rows: Vec<ProfileRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Sign in with email and password (password grant).
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected.
    #[instrument(skip(self, email, password))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.inner.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Register a new account. The backend sends a confirmation email.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration.
    #[instrument(skip(self, email, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), SupabaseError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("/auth/v1/signup"))
            .header("apikey", &self.inner.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        Self::check(response).await.map(|_| ())
    }

    /// Revoke the session behind `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("/auth/v1/logout"))
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(Some(access_token)))
            .send()
            .await?;

        Self::check(response).await.map(|_| ())
    }

    // =========================================================================
    // Storage
    // =========================================================================

    /// Upload an object into the product-images bucket and return its
    /// public URL.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::BucketNotFound`] when the bucket does not
    /// exist, so callers can surface actionable guidance.
    #[instrument(skip(self, access_token, bytes), fields(size = bytes.len()))]
    pub async fn upload_object(
        &self,
        access_token: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, SupabaseError> {
        let bucket = &self.inner.product_images_bucket;
        let response = self
            .inner
            .http
            .post(self.endpoint(&format!("/storage/v1/object/{bucket}/{key}")))
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(Some(access_token)))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        match Self::check(response).await {
            Ok(_) => Ok(self.public_object_url(key)),
            // The storage endpoint signals a missing bucket as a 404 (or a
            // "Bucket not found" message on older versions)
            Err(SupabaseError::Api { status, message })
                if status == 404 || message.to_lowercase().contains("bucket not found") =>
            {
                Err(SupabaseError::BucketNotFound(bucket.clone()))
            }
            Err(err) => Err(err),
        }
    }

    /// Public URL for an object in the product-images bucket.
    #[must_use]
    pub fn public_object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{key}",
            self.inner.base_url, self.inner.product_images_bucket
        )
    }
}
