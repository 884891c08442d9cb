//! Cart reducer: a pure left fold of [`CartAction`]s over [`CartState`].
//!
//! The fold never fails and never produces effects. Commands that refer to
//! a product not in the cart are no-ops.

use crate::types::{CartAction, CartItem, CartState, Product, ProductId};
use reactive_stores_core::effect::Effect;
use reactive_stores_core::reducer::Reducer;
use reactive_stores_core::SmallVec;

/// Reducer implementing the cart fold
#[derive(Clone, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new cart reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Apply one action to `state`
    ///
    /// Replaying the same actions against the same starting state always
    /// yields the same cart.
    pub fn apply(state: &mut CartState, action: CartAction) {
        match action {
            CartAction::Add(product) => Self::add(state, product),
            CartAction::Remove(id) => Self::remove(state, id),
            CartAction::SetQuantity { id, quantity } => Self::set_quantity(state, id, quantity),
            CartAction::Clear => state.items.clear(),
        }
    }

    fn add(state: &mut CartState, product: Product) {
        match state.items.iter_mut().find(|item| item.product.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => state.items.push(CartItem {
                product,
                quantity: 1,
            }),
        }
    }

    fn remove(state: &mut CartState, id: ProductId) {
        state.items.retain(|item| item.product.id != id);
    }

    fn set_quantity(state: &mut CartState, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            Self::remove(state, id);
            return;
        }
        // Quantities past u32::MAX clamp
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        if let Some(item) = state.items.iter_mut().find(|item| item.product.id == id) {
            item.quantity = quantity;
        }
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.name(), "Reducing cart action");
        Self::apply(state, action);
        SmallVec::new()
    }
}
