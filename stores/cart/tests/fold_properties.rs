//! Property tests for the cart fold.

use cart_store::{CartAction, CartReducer, CartState, Product, ProductId};
use proptest::prelude::*;

fn product() -> impl Strategy<Value = Product> {
    (1_u32..6).prop_map(|id| Product::new(u64::from(id), format!("product-{id}"), f64::from(id) * 2.5))
}

fn action() -> impl Strategy<Value = CartAction> {
    prop_oneof![
        4 => product().prop_map(CartAction::Add),
        2 => (1_u64..6).prop_map(|id| CartAction::Remove(ProductId::new(id))),
        3 => (1_u64..6, -3_i64..6).prop_map(|(id, quantity)| CartAction::SetQuantity {
            id: ProductId::new(id),
            quantity,
        }),
        1 => Just(CartAction::Clear),
    ]
}

fn fold(actions: &[CartAction]) -> CartState {
    let mut state = CartState::new();
    for action in actions {
        CartReducer::apply(&mut state, action.clone());
    }
    state
}

proptest! {
    #[test]
    fn replaying_the_same_actions_yields_the_same_cart(actions in prop::collection::vec(action(), 0..40)) {
        prop_assert_eq!(fold(&actions), fold(&actions));
    }

    #[test]
    fn cart_never_stores_empty_or_duplicate_items(actions in prop::collection::vec(action(), 0..40)) {
        let state = fold(&actions);

        prop_assert!(state.items.iter().all(|item| item.quantity >= 1));

        let mut ids: Vec<ProductId> = state.items.iter().map(|item| item.product.id).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), state.items.len());
    }

    #[test]
    fn non_positive_quantity_removes(actions in prop::collection::vec(action(), 0..20), id in 1_u64..6, quantity in -10_i64..=0) {
        let mut state = fold(&actions);
        CartReducer::apply(&mut state, CartAction::SetQuantity { id: ProductId::new(id), quantity });

        prop_assert!(!state.has_product(ProductId::new(id)));
    }

    #[test]
    fn total_items_is_sum_of_quantities(actions in prop::collection::vec(action(), 0..40)) {
        let state = fold(&actions);
        let sum: u64 = state.items.iter().map(|item| u64::from(item.quantity)).sum();

        prop_assert_eq!(state.total_items(), sum);
    }
}
