//! Core domain types for the cart.
//!
//! A cart is an ordered list of [`CartItem`]s, at most one per product,
//! each with a quantity of at least one. Totals are always computed from
//! the items and never stored next to them.

use reactive_stores_macros::Action;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a product
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Creates a new `ProductId`
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the inner value
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product that can be put in the cart
///
/// Immutable value; identity is `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: f64,
}

impl Product {
    /// Creates a new product
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
            price,
        }
    }
}

/// A product and how many of it are in the cart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product
    pub product: Product,
    /// Always at least one
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line: unit price times quantity
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// Cart snapshot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    /// Items in insertion order
    pub items: Vec<CartItem>,
}

impl CartState {
    /// Creates an empty cart
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Sum of price × quantity over all items
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Sum of quantities over all items
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Number of distinct products
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item for `id`, if present
    #[must_use]
    pub fn item(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == id)
    }

    /// Quantity of `id` in the cart (0 when absent)
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.item(id).map_or(0, |item| item.quantity)
    }

    /// Whether `id` is in the cart
    #[must_use]
    pub fn has_product(&self, id: ProductId) -> bool {
        self.item(id).is_some()
    }
}

/// Commands folded into the cart
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CartAction {
    /// Add one unit of a product
    #[command]
    Add(Product),

    /// Remove a product entirely
    #[command]
    Remove(ProductId),

    /// Replace a product's quantity; zero or less removes it
    #[command]
    SetQuantity {
        /// Product to update
        id: ProductId,
        /// New quantity
        quantity: i64,
    },

    /// Empty the cart
    #[command]
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> CartState {
        CartState {
            items: vec![
                CartItem {
                    product: Product::new(1, "Keyboard", 49.5),
                    quantity: 2,
                },
                CartItem {
                    product: Product::new(2, "Mouse", 20.0),
                    quantity: 1,
                },
            ],
        }
    }

    #[test]
    fn test_totals() {
        let state = cart();
        assert!((state.total_price() - 119.0).abs() < f64::EPSILON);
        assert_eq!(state.total_items(), 3);
        assert_eq!(state.item_count(), 2);
    }

    #[test]
    fn test_lookup_views() {
        let state = cart();
        assert_eq!(state.quantity_of(ProductId::new(1)), 2);
        assert_eq!(state.quantity_of(ProductId::new(9)), 0);
        assert!(state.has_product(ProductId::new(2)));
        assert!(state.item(ProductId::new(9)).is_none());
        assert!(!state.is_empty());
        assert!(CartState::new().is_empty());
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let state = CartState::default();
        assert!(state.total_price().abs() < f64::EPSILON);
        assert_eq!(state.total_items(), 0);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(CartAction::Clear.name(), "Clear");
        assert!(CartAction::Remove(ProductId::new(1)).is_command());
    }
}
