//! The in-memory shopping cart store.
//!
//! The cart is the only state this application owns. It lives in the
//! visitor's session, is mutated only by their own requests, and derives its
//! totals from the current lines on every read.
//!
//! # Invariants
//!
//! - At most one line per distinct product ID; repeated adds merge into the
//!   existing line by incrementing its quantity.
//! - Every stored line has quantity >= 1. A quantity update below 1 is
//!   silently rejected - removal requires an explicit [`Cart::remove_item`].
//! - Line IDs are generated on first add and stay stable for the life of the
//!   line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartLineId, Product};

/// One entry in the shopping cart: a product snapshot and a quantity.
///
/// The product is captured at add time and not live-linked to the catalog;
/// a later price change does not affect lines already in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Client-generated ID, unique per cart session.
    pub id: CartLineId,
    /// Snapshot of the product as it was when first added.
    pub product: Product,
    /// Number of units. Always >= 1.
    pub quantity: u32,
}

impl CartLine {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_price(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `product` to the cart.
    ///
    /// If a line already references this product ID its quantity is
    /// incremented by 1; otherwise a new line with quantity 1 and a freshly
    /// generated ID is appended. Always succeeds; returns the ID of the
    /// affected line.
    pub fn add_item(&mut self, product: Product) -> CartLineId {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity += 1;
            return line.id;
        }

        let id = CartLineId::generate();
        self.lines.push(CartLine {
            id,
            product,
            quantity: 1,
        });
        id
    }

    /// Replace the quantity of the line with `line_id`.
    ///
    /// A `quantity` below 1 is a no-op: quantity changes never delete a
    /// line. An unknown `line_id` is also a no-op.
    pub fn update_quantity(&mut self, line_id: CartLineId, quantity: u32) {
        if quantity < 1 {
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.id == line_id) {
            line.quantity = quantity;
        }
    }

    /// Remove the line with `line_id`, if present. Idempotent.
    pub fn remove_item(&mut self, line_id: CartLineId) {
        self.lines.retain(|line| line.id != line_id);
    }

    /// The current cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of `price * quantity` across all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_price).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{CategoryId, Product, ProductId, Unit};

    fn product(name: &str, price_cents: i64) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_owned(),
            description: format!("{name} description"),
            price: Decimal::new(price_cents, 2),
            category_id: CategoryId::generate(),
            category_name: None,
            image_url: None,
            stock: 10,
            unit: Unit::Piece,
        }
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut cart = Cart::new();
        let apple = product("Apples", 250);

        for _ in 0..5 {
            cart.add_item(apple.clone());
        }

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn add_returns_a_stable_line_id() {
        let mut cart = Cart::new();
        let apple = product("Apples", 250);

        let first = cart.add_item(apple.clone());
        let second = cart.add_item(apple);
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_products_get_distinct_lines() {
        let mut cart = Cart::new();
        cart.add_item(product("Apples", 250));
        cart.add_item(product("Milk", 100));

        assert_eq!(cart.lines().len(), 2);
        assert_ne!(cart.lines()[0].id, cart.lines()[1].id);
    }

    #[test]
    fn update_quantity_replaces_the_quantity() {
        let mut cart = Cart::new();
        let id = cart.add_item(product("Apples", 250));

        cart.update_quantity(id, 7);
        assert_eq!(cart.lines()[0].quantity, 7);
    }

    #[test]
    fn update_quantity_below_one_is_a_no_op() {
        let mut cart = Cart::new();
        let id = cart.add_item(product("Apples", 250));
        cart.update_quantity(id, 3);

        cart.update_quantity(id, 0);

        // Line neither changed nor removed
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn update_quantity_with_unknown_id_is_a_no_op() {
        let mut cart = Cart::new();
        cart.add_item(product("Apples", 250));

        cart.update_quantity(CartLineId::generate(), 9);
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn removal_is_idempotent() {
        let mut cart = Cart::new();
        let id = cart.add_item(product("Apples", 250));

        cart.remove_item(id);
        assert!(cart.is_empty());

        // Operations referencing the removed ID are no-ops
        cart.remove_item(id);
        cart.update_quantity(id, 5);
        assert!(cart.is_empty());
    }

    #[test]
    fn totals_follow_the_scenario() {
        // Add A ($2.50) twice, add B ($1.00) once:
        // 2 lines, A.quantity == 2, count == 3, total == $6.00
        let mut cart = Cart::new();
        let a = product("A", 250);
        let b = product("B", 100);

        cart.add_item(a.clone());
        cart.add_item(a);
        cart.add_item(b);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total_count(), 3);
        assert_eq!(cart.total_price(), Decimal::new(600, 2));
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let cart = Cart::new();
        assert_eq!(cart.total_count(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn cart_round_trips_through_session_serialization() {
        let mut cart = Cart::new();
        cart.add_item(product("Apples", 250));
        cart.add_item(product("Milk", 100));

        let json = serde_json::to_string(&cart).unwrap();
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }
}
