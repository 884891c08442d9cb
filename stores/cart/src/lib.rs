//! Shopping cart store.
//!
//! Every cart command becomes a [`CartAction`] on the cart's single ordered
//! action stream. A pure fold turns the stream into cart snapshots, and the
//! totals consumers display are derived views of those snapshots, never
//! stored next to the items.
//!
//! # Example Usage
//!
//! ```no_run
//! use cart_store::{CartStore, Product, ProductId};
//!
//! # async fn example() -> Result<(), reactive_stores_runtime::StoreError> {
//! let cart = CartStore::new();
//! let total = cart.total_price();
//!
//! cart.add_to_cart(Product::new(1, "Keyboard", 49.5)).await?;
//! cart.increase(ProductId::new(1)).await?;
//!
//! assert_eq!(total.get(), 99.0);
//! # Ok(())
//! # }
//! ```
//!
//! The [`search`] module holds a separate read path over the product
//! catalog.

pub mod reducer;
pub mod search;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use reducer::CartReducer;
pub use search::{CatalogProduct, ProductCatalog};
pub use store::{CartRuntime, CartStore};
pub use types::{CartAction, CartItem, CartState, Product, ProductId};
