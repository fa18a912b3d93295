//! Catalog record types.
//!
//! These are the client's read-only copies of remotely owned records. A
//! [`Product`] held by a cart line is a snapshot taken at add time - price
//! and name are not live-linked to later catalog fetches.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::unit::Unit;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID (remotely assigned).
    pub id: CategoryId,
    /// Display name.
    pub name: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID (remotely assigned).
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Description shown on the product card.
    pub description: String,
    /// Price per unit. Non-negative.
    pub price: Decimal,
    /// Category this product belongs to.
    pub category_id: CategoryId,
    /// Display name of the category, when the fetch embedded it.
    pub category_name: Option<String>,
    /// Public URL of the product image, if any.
    pub image_url: Option<String>,
    /// Units in stock.
    pub stock: u32,
    /// Unit of measure the price applies to.
    pub unit: Unit,
}
