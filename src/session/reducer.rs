//! Pure session transitions. No storage, no network.

use super::action::Action;
use super::error::SessionError;
use super::state::SessionState;

/// Apply one action to `state`, producing the next state.
///
/// Product capacity is not checked here; [`super::FormSession`] rejects an
/// over-limit `AddProduct` before it reaches the reducer.
pub fn reduce(state: &SessionState, action: Action) -> Result<SessionState, SessionError> {
    let mut next = state.clone();

    match action {
        Action::SetUser(patch) => {
            let base = next.user.take().unwrap_or_default();
            next.user = Some(base.merged(patch));
        }
        Action::SetSeller(patch) => {
            let base = next.seller.take().unwrap_or_default();
            next.seller = Some(base.merged(patch));
        }
        Action::AddProduct(product) => {
            next.products.push(product);
        }
        Action::UpdateProduct { index, product } => {
            let len = next.products.len();
            let slot = next
                .products
                .get_mut(index)
                .ok_or(SessionError::InvalidIndex { index, len })?;
            *slot = product;
        }
        Action::RemoveProduct(index) => {
            let len = next.products.len();
            if index >= len {
                return Err(SessionError::InvalidIndex { index, len });
            }
            next.products.remove(index);
        }
        Action::SetStep(step) => {
            next.current_step = step;
        }
        Action::SetSubmitting(flag) => {
            next.is_submitting = flag;
        }
        Action::ResetForm => {
            next = SessionState::initial();
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::{ProductDraft, SellerDraft, Step, UserDraft};

    fn product(name: &str) -> ProductDraft {
        ProductDraft {
            name: Some(name.to_string()),
            mrp: Some(100.0),
            msp: Some(90.0),
            ..Default::default()
        }
    }

    fn apply_all(actions: Vec<Action>) -> SessionState {
        actions
            .into_iter()
            .fold(SessionState::initial(), |state, action| {
                reduce(&state, action).unwrap()
            })
    }

    #[test]
    fn test_set_user_then_step() {
        let state = apply_all(vec![
            Action::SetUser(UserDraft {
                id: Some("u1".to_string()),
                name: Some("Alice".to_string()),
                phone: Some("9876543210".to_string()),
                stats: None,
            }),
            Action::SetStep(Step::Seller),
        ]);

        assert_eq!(state.user_id(), Some("u1"));
        assert_eq!(state.current_step, Step::Seller);
        assert_eq!(state.products.len(), 0);
    }

    #[test]
    fn test_set_user_merges() {
        let state = apply_all(vec![
            Action::SetUser(UserDraft {
                id: Some("u1".to_string()),
                ..Default::default()
            }),
            Action::SetUser(UserDraft {
                name: Some("Alice".to_string()),
                ..Default::default()
            }),
        ]);
        let user = state.user.unwrap();
        assert_eq!(user.id.as_deref(), Some("u1"));
        assert_eq!(user.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_set_seller_merges() {
        let state = apply_all(vec![
            Action::SetSeller(SellerDraft {
                name: Some("Corner Store".to_string()),
                ..Default::default()
            }),
            Action::SetSeller(SellerDraft {
                id: Some("s1".to_string()),
                ..Default::default()
            }),
        ]);
        assert_eq!(state.seller_id(), Some("s1"));
        assert_eq!(
            state.seller.unwrap().name.as_deref(),
            Some("Corner Store")
        );
    }

    #[test]
    fn test_add_then_remove_is_inverse() {
        let before = apply_all(vec![
            Action::AddProduct(product("a")),
            Action::AddProduct(product("b")),
        ]);
        let added = reduce(&before, Action::AddProduct(product("c"))).unwrap();
        let removed = reduce(&added, Action::RemoveProduct(added.products.len() - 1)).unwrap();
        assert_eq!(removed.products, before.products);
    }

    #[test]
    fn test_duplicates_allowed_and_order_kept() {
        let state = apply_all(vec![
            Action::AddProduct(product("a")),
            Action::AddProduct(product("a")),
            Action::AddProduct(product("b")),
        ]);
        let names: Vec<_> = state
            .products
            .iter()
            .map(|p| p.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "a", "b"]);
    }

    #[test]
    fn test_update_replaces_only_target() {
        let before = apply_all(vec![
            Action::AddProduct(product("a")),
            Action::AddProduct(product("b")),
            Action::AddProduct(product("c")),
        ]);
        let replacement = ProductDraft {
            name: Some("B2".to_string()),
            ..Default::default()
        };
        let after = reduce(
            &before,
            Action::UpdateProduct {
                index: 1,
                product: replacement.clone(),
            },
        )
        .unwrap();

        assert_eq!(after.products[0], before.products[0]);
        assert_eq!(after.products[1], replacement);
        assert_eq!(after.products[2], before.products[2]);
    }

    #[test]
    fn test_update_out_of_range() {
        let state = apply_all(vec![Action::AddProduct(product("a"))]);
        let err = reduce(
            &state,
            Action::UpdateProduct {
                index: 3,
                product: product("x"),
            },
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::InvalidIndex { index: 3, len: 1 }));
    }

    #[test]
    fn test_remove_out_of_range() {
        let err = reduce(&SessionState::initial(), Action::RemoveProduct(0)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidIndex { index: 0, len: 0 }));
    }

    #[test]
    fn test_remove_shifts_left() {
        let state = apply_all(vec![
            Action::AddProduct(product("a")),
            Action::AddProduct(product("b")),
            Action::AddProduct(product("c")),
            Action::RemoveProduct(0),
        ]);
        assert_eq!(state.products[0].name.as_deref(), Some("b"));
        assert_eq!(state.products[1].name.as_deref(), Some("c"));
    }

    #[test]
    fn test_reset_from_any_state() {
        let state = apply_all(vec![
            Action::SetUser(UserDraft {
                id: Some("u1".to_string()),
                ..Default::default()
            }),
            Action::SetSeller(SellerDraft {
                id: Some("s1".to_string()),
                ..Default::default()
            }),
            Action::AddProduct(product("a")),
            Action::SetStep(Step::Products),
            Action::SetSubmitting(true),
            Action::ResetForm,
        ]);
        assert_eq!(state, SessionState::initial());
    }

    #[test]
    fn test_step_is_not_validated() {
        let state = apply_all(vec![Action::SetStep(Step::Products)]);
        assert_eq!(state.current_step, Step::Products);
        assert!(state.user.is_none());
    }

    #[test]
    fn test_replay_is_deterministic() {
        let actions = vec![
            Action::SetUser(UserDraft {
                id: Some("u1".to_string()),
                ..Default::default()
            }),
            Action::SetStep(Step::Seller),
            Action::AddProduct(product("a")),
            Action::SetSubmitting(true),
            Action::SetSubmitting(false),
        ];
        assert_eq!(apply_all(actions.clone()), apply_all(actions));
    }

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let state = SessionState::initial();
        let _ = reduce(&state, Action::AddProduct(product("a"))).unwrap();
        assert!(state.products.is_empty());
    }
}
