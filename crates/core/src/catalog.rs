//! Pure catalog computations.
//!
//! Derived state is recomputed from the current snapshot on every read
//! rather than cached, so the invariants stay trivially checkable. The
//! patch helpers mirror how the admin dashboard keeps its product list
//! consistent with the remote store after a mutation, without a re-fetch.

use crate::types::{CategoryId, Product, ProductId};

/// Filter `products` down to those in the selected category.
///
/// With no selection the full collection is returned unchanged. The relative
/// order of the input (name-sorted by the catalog loader) is preserved, and
/// the input itself is never mutated.
#[must_use]
pub fn filter_by_category(products: &[Product], selected: Option<CategoryId>) -> Vec<Product> {
    match selected {
        Some(category_id) => products
            .iter()
            .filter(|product| product.category_id == category_id)
            .cloned()
            .collect(),
        None => products.to_vec(),
    }
}

/// Append a freshly created product to a local list.
///
/// The dashboard's equivalent is the row fragment appended to the table
/// by the create response.
pub fn apply_created(products: &mut Vec<Product>, created: Product) {
    products.push(created);
}

/// Replace the product with a matching ID. Unknown IDs are a no-op.
///
/// The dashboard's equivalent is the row fragment swapped in over the
/// edited row.
pub fn apply_updated(products: &mut [Product], updated: Product) {
    if let Some(slot) = products.iter_mut().find(|p| p.id == updated.id) {
        *slot = updated;
    }
}

/// Remove the product with `id` from a local list. Idempotent.
///
/// The dashboard's equivalent is the empty delete response removing the
/// row.
pub fn apply_deleted(products: &mut Vec<Product>, id: ProductId) {
    products.retain(|product| product.id != id);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::Unit;

    fn product(name: &str, category_id: CategoryId) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_owned(),
            description: String::new(),
            price: Decimal::new(100, 2),
            category_id,
            category_name: None,
            image_url: None,
            stock: 1,
            unit: Unit::Piece,
        }
    }

    #[test]
    fn no_selection_returns_the_collection_unchanged() {
        let category = CategoryId::generate();
        let products = vec![product("Apples", category), product("Milk", category)];

        let filtered = filter_by_category(&products, None);
        assert_eq!(filtered, products);
    }

    #[test]
    fn selection_keeps_only_matching_products_in_order() {
        let fruit = CategoryId::generate();
        let dairy = CategoryId::generate();
        let products = vec![
            product("Apples", fruit),
            product("Butter", dairy),
            product("Cherries", fruit),
        ];

        let filtered = filter_by_category(&products, Some(fruit));
        let names: Vec<&str> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Apples", "Cherries"]);
    }

    #[test]
    fn unmatched_selection_yields_empty() {
        let products = vec![product("Apples", CategoryId::generate())];
        let filtered = filter_by_category(&products, Some(CategoryId::generate()));
        assert!(filtered.is_empty());
    }

    #[test]
    fn created_products_are_appended() {
        let category = CategoryId::generate();
        let mut products = vec![product("Apples", category)];

        apply_created(&mut products, product("Milk", category));
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].name, "Milk");
    }

    #[test]
    fn updates_replace_by_id() {
        let category = CategoryId::generate();
        let mut products = vec![product("Apples", category), product("Milk", category)];

        let mut updated = products[0].clone();
        updated.name = "Green Apples".to_owned();
        apply_updated(&mut products, updated);

        assert_eq!(products[0].name, "Green Apples");
        assert_eq!(products[1].name, "Milk");
    }

    #[test]
    fn updates_with_unknown_id_are_a_no_op() {
        let category = CategoryId::generate();
        let mut products = vec![product("Apples", category)];
        let before = products.clone();

        apply_updated(&mut products, product("Stranger", category));
        assert_eq!(products, before);
    }

    #[test]
    fn deletes_remove_by_id_and_are_idempotent() {
        let category = CategoryId::generate();
        let mut products = vec![product("Apples", category), product("Milk", category)];
        let id = products[0].id;

        apply_deleted(&mut products, id);
        assert_eq!(products.len(), 1);

        apply_deleted(&mut products, id);
        assert_eq!(products.len(), 1);
    }
}
