//! Cart store facade: the command API and derived views consumers use.

use crate::reducer::CartReducer;
use crate::types::{CartAction, CartItem, CartState, Product, ProductId};
use reactive_stores_runtime::view::DerivedView;
use reactive_stores_runtime::{Store, StoreError};

/// Runtime store type behind [`CartStore`]
pub type CartRuntime = Store<CartState, CartAction, (), CartReducer>;

/// Shopping cart with an ordered command stream and derived totals
///
/// Cheap to clone; clones share the same cart.
///
/// # Example
///
/// ```ignore
/// let cart = CartStore::new();
/// let mut total = cart.total_price();
///
/// cart.add_to_cart(Product::new(1, "Keyboard", 49.5)).await?;
/// assert_eq!(total.changed().await, Some(49.5));
/// ```
#[derive(Clone)]
pub struct CartStore {
    store: CartRuntime,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Creates an empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(CartState::new())
    }

    /// Creates a cart starting from `state`
    #[must_use]
    pub fn with_state(state: CartState) -> Self {
        Self {
            store: Store::new(state, CartReducer::new(), ()),
        }
    }

    /// Add one unit of `product`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the cart is disposed.
    pub async fn add_to_cart(&self, product: Product) -> Result<(), StoreError> {
        self.store.send(CartAction::Add(product)).await.map(drop)
    }

    /// Remove `id` entirely
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the cart is disposed.
    pub async fn remove_from_cart(&self, id: ProductId) -> Result<(), StoreError> {
        self.store.send(CartAction::Remove(id)).await.map(drop)
    }

    /// Set the quantity of `id`; zero or less removes it
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the cart is disposed.
    pub async fn set_quantity(&self, id: ProductId, quantity: i64) -> Result<(), StoreError> {
        self.store
            .send(CartAction::SetQuantity { id, quantity })
            .await
            .map(drop)
    }

    /// One more of `id`; no-op when it is not in the cart
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the cart is disposed.
    pub async fn increase(&self, id: ProductId) -> Result<(), StoreError> {
        self.adjust(id, 1).await
    }

    /// One less of `id`, removing it at zero; no-op when it is not in the cart
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the cart is disposed.
    pub async fn decrease(&self, id: ProductId) -> Result<(), StoreError> {
        self.adjust(id, -1).await
    }

    /// Empty the cart
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the cart is disposed.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.send(CartAction::Clear).await.map(drop)
    }

    async fn adjust(&self, id: ProductId, delta: i64) -> Result<(), StoreError> {
        // Read and write under one lock so concurrent adjustments all land
        let sent = self
            .store
            .send_from(|state| {
                state.item(id).map(|item| CartAction::SetQuantity {
                    id,
                    quantity: i64::from(item.quantity) + delta,
                })
            })
            .await?;
        if sent.is_none() {
            tracing::debug!(product_id = %id, "Ignoring adjustment for product not in cart");
        }
        Ok(())
    }

    /// Items in insertion order
    #[must_use]
    pub fn items(&self) -> DerivedView<CartState, Vec<CartItem>> {
        self.store.view(|state: &CartState| state.items.clone())
    }

    /// Sum of price × quantity
    #[must_use]
    pub fn total_price(&self) -> DerivedView<CartState, f64> {
        self.store.view(CartState::total_price)
    }

    /// Sum of quantities
    #[must_use]
    pub fn total_items(&self) -> DerivedView<CartState, u64> {
        self.store.view(CartState::total_items)
    }

    /// Number of distinct products
    #[must_use]
    pub fn item_count(&self) -> DerivedView<CartState, usize> {
        self.store.view(CartState::item_count)
    }

    /// Whether the cart is empty
    #[must_use]
    pub fn is_empty(&self) -> DerivedView<CartState, bool> {
        self.store.view(CartState::is_empty)
    }

    /// Quantity of `id` (0 when absent)
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> DerivedView<CartState, u32> {
        self.store.view(move |state: &CartState| state.quantity_of(id))
    }

    /// Whether `id` is in the cart
    #[must_use]
    pub fn has_product(&self, id: ProductId) -> DerivedView<CartState, bool> {
        self.store.view(move |state: &CartState| state.has_product(id))
    }

    /// The item for `id`, if present
    #[must_use]
    pub fn item(&self, id: ProductId) -> DerivedView<CartState, Option<CartItem>> {
        self.store.view(move |state: &CartState| state.item(id).cloned())
    }

    /// The latest cart snapshot
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.store.snapshot()
    }

    /// The underlying runtime store
    #[must_use]
    pub const fn store(&self) -> &CartRuntime {
        &self.store
    }

    /// Stop accepting commands
    pub fn dispose(&self) {
        tracing::info!("Disposing cart store");
        self.store.dispose();
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.store.snapshot())
            .finish()
    }
}
