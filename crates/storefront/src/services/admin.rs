//! Admin catalog editor.
//!
//! Create, update, and delete of product records against the remote store,
//! including optional image upload. Every operation requires a signed-in
//! user; unauthenticated calls are rejected before any network traffic.

use chrono::Utc;
use rand::distr::{Alphanumeric, SampleString};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use freshmart_core::{CategoryId, Product, ProductId, Unit, UserId};

use crate::models::CurrentUser;
use crate::supabase::types::{NewProductRecord, ProductRecordUpdate};
use crate::supabase::{SupabaseClient, SupabaseError};

/// Length of the random suffix in a storage key.
const STORAGE_KEY_SUFFIX_LEN: usize = 10;

/// Errors that can occur in the admin catalog editor.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No authenticated session; rejected before any network call.
    #[error("not signed in")]
    NotSignedIn,

    /// The configured image bucket does not exist on the backend.
    #[error(
        "storage bucket \"{0}\" not found - create it in the backend project \
         or set PRODUCT_IMAGES_BUCKET to the correct bucket name"
    )]
    StorageBucketMissing(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(SupabaseError),
}

impl From<SupabaseError> for AdminError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::BucketNotFound(bucket) => Self::StorageBucketMissing(bucket),
            other => Self::Backend(other),
        }
    }
}

/// Product fields from the admin form.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    /// Image URL typed into the form (used when no file is uploaded).
    pub image_url: Option<String>,
    pub stock: u32,
    pub unit: Unit,
}

/// An image file selected in the admin form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Store operations the admin editor needs.
pub trait AdminStore {
    fn list_products_for_user(
        &self,
        access_token: &str,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Product>, SupabaseError>> + Send;

    fn insert_product(
        &self,
        access_token: &str,
        record: &NewProductRecord,
    ) -> impl Future<Output = Result<Product, SupabaseError>> + Send;

    fn update_product(
        &self,
        access_token: &str,
        id: ProductId,
        record: &ProductRecordUpdate,
    ) -> impl Future<Output = Result<Product, SupabaseError>> + Send;

    fn delete_product(
        &self,
        access_token: &str,
        id: ProductId,
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send;

    fn upload_image(
        &self,
        access_token: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<String, SupabaseError>> + Send;
}

impl AdminStore for SupabaseClient {
    async fn list_products_for_user(
        &self,
        access_token: &str,
        user_id: UserId,
    ) -> Result<Vec<Product>, SupabaseError> {
        Self::list_products_for_user(self, access_token, user_id).await
    }

    async fn insert_product(
        &self,
        access_token: &str,
        record: &NewProductRecord,
    ) -> Result<Product, SupabaseError> {
        Self::insert_product(self, access_token, record).await
    }

    async fn update_product(
        &self,
        access_token: &str,
        id: ProductId,
        record: &ProductRecordUpdate,
    ) -> Result<Product, SupabaseError> {
        Self::update_product(self, access_token, id, record).await
    }

    async fn delete_product(
        &self,
        access_token: &str,
        id: ProductId,
    ) -> Result<(), SupabaseError> {
        Self::delete_product(self, access_token, id).await
    }

    async fn upload_image(
        &self,
        access_token: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, SupabaseError> {
        self.upload_object(access_token, key, bytes, content_type)
            .await
    }
}

/// The admin catalog editor service.
pub struct AdminCatalogService<S> {
    store: S,
}

impl<S: AdminStore> AdminCatalogService<S> {
    /// Create a new admin service over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// List the signed-in user's own products.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotSignedIn`] without any network call when
    /// `auth` is `None`.
    pub async fn products(&self, auth: Option<&CurrentUser>) -> Result<Vec<Product>, AdminError> {
        let user = auth.ok_or(AdminError::NotSignedIn)?;
        Ok(self
            .store
            .list_products_for_user(&user.access_token, user.id)
            .await?)
    }

    /// Create a product, uploading the image first when one was selected.
    ///
    /// The uploaded image's public URL replaces whatever URL was typed into
    /// the form.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotSignedIn`] without any network call when
    /// `auth` is `None`, and [`AdminError::StorageBucketMissing`] when the
    /// upload target does not exist.
    #[instrument(skip(self, auth, draft, image), fields(product = %draft.name))]
    pub async fn create_product(
        &self,
        auth: Option<&CurrentUser>,
        draft: ProductDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, AdminError> {
        let user = auth.ok_or(AdminError::NotSignedIn)?;

        let mut image_url = draft.image_url.filter(|url| !url.is_empty());
        if let Some(image) = image {
            let key = storage_key(&image.file_name);
            let url = self
                .store
                .upload_image(&user.access_token, &key, image.bytes, &image.content_type)
                .await?;
            image_url = Some(url);
        }

        let record = NewProductRecord {
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category_id: draft.category_id,
            image_url,
            stock: draft.stock,
            unit: draft.unit,
            user_id: user.id,
        };

        Ok(self.store.insert_product(&user.access_token, &record).await?)
    }

    /// Replace the product record with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotSignedIn`] without any network call when
    /// `auth` is `None`.
    #[instrument(skip(self, auth, draft))]
    pub async fn update_product(
        &self,
        auth: Option<&CurrentUser>,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, AdminError> {
        let user = auth.ok_or(AdminError::NotSignedIn)?;

        let record = ProductRecordUpdate {
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category_id: draft.category_id,
            image_url: draft.image_url.filter(|url| !url.is_empty()),
            stock: draft.stock,
            unit: draft.unit,
        };

        Ok(self
            .store
            .update_product(&user.access_token, id, &record)
            .await?)
    }

    /// Delete the product record with `id`.
    ///
    /// Confirmation is the caller's responsibility; the dashboard asks
    /// before submitting.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotSignedIn`] without any network call when
    /// `auth` is `None`.
    #[instrument(skip(self, auth))]
    pub async fn delete_product(
        &self,
        auth: Option<&CurrentUser>,
        id: ProductId,
    ) -> Result<(), AdminError> {
        let user = auth.ok_or(AdminError::NotSignedIn)?;
        Ok(self.store.delete_product(&user.access_token, id).await?)
    }
}

/// Derive a storage key for an uploaded file.
///
/// Millisecond timestamp plus a random alphanumeric suffix, keeping the
/// original file extension so the public URL stays content-type hinted.
#[must_use]
pub fn storage_key(file_name: &str) -> String {
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), STORAGE_KEY_SUFFIX_LEN)
        .to_lowercase();
    let timestamp = Utc::now().timestamp_millis();

    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{timestamp}_{suffix}.{ext}"),
        _ => format!("{timestamp}_{suffix}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use freshmart_core::Email;

    use super::*;

    /// Store double that records calls and can pretend its bucket is gone.
    #[derive(Default)]
    struct FakeStore {
        calls: AtomicUsize,
        bucket_missing: bool,
    }

    impl FakeStore {
        fn network_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn product(name: &str) -> Product {
            Product {
                id: ProductId::generate(),
                name: name.to_owned(),
                description: String::new(),
                price: Decimal::new(100, 2),
                category_id: CategoryId::generate(),
                category_name: Some("Fruit".to_owned()),
                image_url: None,
                stock: 5,
                unit: Unit::Piece,
            }
        }
    }

    impl AdminStore for &FakeStore {
        async fn list_products_for_user(
            &self,
            _access_token: &str,
            _user_id: UserId,
        ) -> Result<Vec<Product>, SupabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![FakeStore::product("Apples")])
        }

        async fn insert_product(
            &self,
            _access_token: &str,
            record: &NewProductRecord,
        ) -> Result<Product, SupabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut product = FakeStore::product(&record.name);
            product.image_url.clone_from(&record.image_url);
            Ok(product)
        }

        async fn update_product(
            &self,
            _access_token: &str,
            id: ProductId,
            record: &ProductRecordUpdate,
        ) -> Result<Product, SupabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut product = FakeStore::product(&record.name);
            product.id = id;
            Ok(product)
        }

        async fn delete_product(
            &self,
            _access_token: &str,
            _id: ProductId,
        ) -> Result<(), SupabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn upload_image(
            &self,
            _access_token: &str,
            key: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, SupabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.bucket_missing {
                return Err(SupabaseError::BucketNotFound("product-images".to_owned()));
            }
            Ok(format!("https://cdn.example/product-images/{key}"))
        }
    }

    fn signed_in() -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            email: Email::parse("admin@example.com").unwrap(),
            access_token: "token".to_owned(),
            is_admin: true,
        }
    }

    fn draft(name: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_owned(),
            description: "desc".to_owned(),
            price: Decimal::new(250, 2),
            category_id: CategoryId::generate(),
            image_url: None,
            stock: 3,
            unit: Unit::Kg,
        }
    }

    #[tokio::test]
    async fn unauthenticated_create_is_rejected_before_any_network_call() {
        let store = FakeStore::default();
        let service = AdminCatalogService::new(&store);

        let result = service.create_product(None, draft("Apples"), None).await;
        assert!(matches!(result, Err(AdminError::NotSignedIn)));
        assert_eq!(store.network_calls(), 0);
    }

    #[tokio::test]
    async fn unauthenticated_update_delete_and_list_are_rejected() {
        let store = FakeStore::default();
        let service = AdminCatalogService::new(&store);
        let id = ProductId::generate();

        assert!(matches!(
            service.update_product(None, id, draft("Apples")).await,
            Err(AdminError::NotSignedIn)
        ));
        assert!(matches!(
            service.delete_product(None, id).await,
            Err(AdminError::NotSignedIn)
        ));
        assert!(matches!(
            service.products(None).await,
            Err(AdminError::NotSignedIn)
        ));
        assert_eq!(store.network_calls(), 0);
    }

    #[tokio::test]
    async fn create_without_image_keeps_the_typed_url() {
        let store = FakeStore::default();
        let service = AdminCatalogService::new(&store);
        let user = signed_in();

        let mut draft = draft("Apples");
        draft.image_url = Some("https://example.com/apples.jpg".to_owned());

        let product = service
            .create_product(Some(&user), draft, None)
            .await
            .unwrap();
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://example.com/apples.jpg")
        );
        assert_eq!(store.network_calls(), 1); // insert only, no upload
    }

    #[tokio::test]
    async fn create_with_image_uploads_first_and_attaches_the_public_url() {
        let store = FakeStore::default();
        let service = AdminCatalogService::new(&store);
        let user = signed_in();

        let image = ImageUpload {
            file_name: "apples.png".to_owned(),
            content_type: "image/png".to_owned(),
            bytes: vec![1, 2, 3],
        };

        let product = service
            .create_product(Some(&user), draft("Apples"), Some(image))
            .await
            .unwrap();

        let url = product.image_url.unwrap();
        assert!(url.starts_with("https://cdn.example/product-images/"));
        assert!(url.ends_with(".png"));
        assert_eq!(store.network_calls(), 2); // upload then insert
    }

    #[tokio::test]
    async fn missing_bucket_is_surfaced_distinctly() {
        let store = FakeStore {
            bucket_missing: true,
            ..FakeStore::default()
        };
        let service = AdminCatalogService::new(&store);
        let user = signed_in();

        let image = ImageUpload {
            file_name: "apples.png".to_owned(),
            content_type: "image/png".to_owned(),
            bytes: vec![1, 2, 3],
        };

        let result = service
            .create_product(Some(&user), draft("Apples"), Some(image))
            .await;
        assert!(matches!(
            result,
            Err(AdminError::StorageBucketMissing(bucket)) if bucket == "product-images"
        ));
        // The insert never happened
        assert_eq!(store.network_calls(), 1);
    }

    #[test]
    fn bucket_missing_message_is_actionable() {
        let message =
            AdminError::StorageBucketMissing("product-images".to_owned()).to_string();
        assert!(message.contains("product-images"));
        assert!(message.contains("PRODUCT_IMAGES_BUCKET"));
    }

    #[test]
    fn storage_keys_keep_the_extension_and_are_unique() {
        let a = storage_key("photo.JPG");
        let b = storage_key("photo.JPG");
        assert!(a.ends_with(".JPG"));
        assert_ne!(a, b);

        let bare = storage_key("no-extension");
        assert!(!bare.contains('.'));
    }
}
