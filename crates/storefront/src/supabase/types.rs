//! Wire types for the backend's REST endpoints.
//!
//! These mirror the backend's record shapes and are converted into the clean
//! domain types from `freshmart-core` at the client boundary, so the rest of
//! the application never sees raw rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use freshmart_core::{Category, CategoryId, Product, ProductId, Unit, UserId};

// =============================================================================
// Record Rows (PostgREST)
// =============================================================================

/// A `categories` row.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

/// The category name embedded by `select=*,categories(name)`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedCategory {
    pub name: String,
}

/// A `products` row, optionally with its category embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    #[serde(default)]
    pub categories: Option<EmbeddedCategory>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub unit: Unit,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: row.category_id,
            category_name: row.categories.map(|c| c.name),
            image_url: row.image_url.filter(|url| !url.is_empty()),
            stock: row.stock,
            unit: row.unit,
        }
    }
}

/// Insert payload for a `products` row.
///
/// `user_id` ties the record to its owner so the backend's row-level
/// security accepts the insert.
#[derive(Debug, Clone, Serialize)]
pub struct NewProductRecord {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub stock: u32,
    pub unit: Unit,
    pub user_id: UserId,
}

/// Full-record replace payload for a `products` row.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecordUpdate {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub image_url: Option<String>,
    pub stock: u32,
    pub unit: Unit,
}

/// A `profiles` row (admin flag lookup).
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    #[serde(default)]
    pub is_admin: bool,
}

// =============================================================================
// Session Types (GoTrue)
// =============================================================================

/// The authenticated user inside a session response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session returned by the password grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for subsequent record and storage requests.
    pub access_token: String,
    pub user: AuthUser,
}

/// Error body shapes used across the backend's endpoints.
///
/// PostgREST uses `message`, GoTrue uses `msg` or `error_description`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ApiErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.msg).or(self.error_description)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn product_row_converts_with_embedded_category() {
        let json = serde_json::json!({
            "id": "5f8b1f6e-58e7-4fb4-9d60-6d1a23c4a111",
            "name": "Apples",
            "description": "Crisp and sweet",
            "price": "2.50",
            "category_id": "0c7ee1c7-9cbe-43d9-9d1a-2bd1f44b2222",
            "categories": { "name": "Fruit" },
            "image_url": "https://cdn.example/apples.jpg",
            "stock": 12,
            "unit": "kg"
        });

        let row: ProductRow = serde_json::from_value(json).unwrap();
        let product = Product::from(row);
        assert_eq!(product.category_name.as_deref(), Some("Fruit"));
        assert_eq!(product.unit, Unit::Kg);
        assert_eq!(product.price, Decimal::new(250, 2));
    }

    #[test]
    fn product_row_accepts_numeric_price_and_missing_embeds() {
        let json = serde_json::json!({
            "id": "5f8b1f6e-58e7-4fb4-9d60-6d1a23c4a111",
            "name": "Milk",
            "price": 1.0,
            "category_id": "0c7ee1c7-9cbe-43d9-9d1a-2bd1f44b2222",
        });

        let row: ProductRow = serde_json::from_value(json).unwrap();
        let product = Product::from(row);
        assert_eq!(product.category_name, None);
        assert_eq!(product.image_url, None);
        assert_eq!(product.stock, 0);
        assert_eq!(product.unit, Unit::Piece);
    }

    #[test]
    fn empty_image_urls_become_none() {
        let json = serde_json::json!({
            "id": "5f8b1f6e-58e7-4fb4-9d60-6d1a23c4a111",
            "name": "Milk",
            "price": "1.00",
            "category_id": "0c7ee1c7-9cbe-43d9-9d1a-2bd1f44b2222",
            "image_url": "",
        });

        let row: ProductRow = serde_json::from_value(json).unwrap();
        assert_eq!(Product::from(row).image_url, None);
    }

    #[test]
    fn error_body_prefers_postgrest_message() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message":"permission denied"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("permission denied"));

        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error_description":"Invalid login credentials"}"#).unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("Invalid login credentials")
        );
    }
}
