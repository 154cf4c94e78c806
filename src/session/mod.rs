//! Form session: the state of one wizard pass and its durable mirror.
//!
//! [`FormSession`] is the single owner of a [`SessionState`]. Every change
//! goes through [`FormSession::dispatch`], which checks product capacity,
//! runs the pure [`reducer::reduce`] and saves the result before returning.
//! A transition whose save fails is rolled back, so the persisted copy and
//! the in-memory one agree after every call.

pub mod action;
pub mod capacity;
pub mod error;
pub mod gate;
pub mod persistence;
pub mod reducer;
pub mod state;

pub use action::Action;
pub use capacity::{Capacity, CapacityError};
pub use error::SessionError;
pub use gate::{Navigation, Route, SubmissionBlocked};
pub use persistence::{
    FileKeyValueStore, KeyValueStore, LoadOutcome, MemoryKeyValueStore, PersistenceBridge,
};
pub use state::{ProductDraft, SellerDraft, SessionState, Step, UserDraft, UserStats};

/// How the session was initialized on open
#[derive(Debug)]
pub enum Hydration {
    Fresh,
    Restored {
        /// Stored products dropped because they exceeded capacity
        dropped_products: usize,
    },
    /// Stored value was corrupt and discarded
    Discarded(SessionError),
}

pub struct FormSession<K: KeyValueStore> {
    state: SessionState,
    bridge: PersistenceBridge<K>,
    capacity: Capacity,
}

impl<K: KeyValueStore> FormSession<K> {
    /// Open a session over `store`, hydrating from any persisted state.
    pub fn open(store: K, capacity: Capacity) -> Result<(Self, Hydration), SessionError> {
        let mut session = Self {
            state: SessionState::initial(),
            bridge: PersistenceBridge::new(store),
            capacity,
        };
        let hydration = session.hydrate()?;
        Ok((session, hydration))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn store(&self) -> &K {
        self.bridge.store()
    }

    pub fn is_authenticated(&self) -> bool {
        gate::is_authenticated(&self.state)
    }

    pub fn check_route(&self, route: Route) -> Navigation {
        gate::check_route(&self.state, route)
    }

    pub fn check_submission(&self) -> Result<(), SubmissionBlocked> {
        gate::check_submission(&self.state, self.capacity)
    }

    /// Apply `action` and persist the resulting state.
    ///
    /// If the save fails the previous state is restored, so memory and the
    /// durable copy never disagree after an error.
    pub fn dispatch(&mut self, action: Action) -> Result<&SessionState, SessionError> {
        let previous = self.state.clone();
        self.apply(action)?;
        if let Err(err) = self.bridge.save(&self.state) {
            tracing::warn!(error = %err, "Session save failed, transition rolled back");
            self.state = previous;
            return Err(err);
        }
        Ok(&self.state)
    }

    /// Parse a tagged JSON action and dispatch it
    pub fn dispatch_json(&mut self, json: &str) -> Result<&SessionState, SessionError> {
        let action = Action::parse(json)?;
        self.dispatch(action)
    }

    /// Clear the session back to the initial state
    pub fn reset(&mut self) -> Result<&SessionState, SessionError> {
        self.dispatch(Action::ResetForm)
    }

    fn apply(&mut self, action: Action) -> Result<(), SessionError> {
        if matches!(action, Action::AddProduct(_)) && !self.capacity.can_add(self.state.products.len())
        {
            return Err(SessionError::CapacityExceeded {
                maximum: self.capacity.maximum(),
            });
        }

        let kind = action.kind();
        let next = reducer::reduce(&self.state, action)?;
        self.state = next;

        tracing::debug!(
            action = kind,
            step = %self.state.current_step,
            products = self.state.products.len(),
            submitting = self.state.is_submitting,
            "Session transition"
        );
        Ok(())
    }

    /// Reset, then replay the persisted fields through the action vocabulary
    /// so hydration is subject to the same checks as live dispatches.
    fn hydrate(&mut self) -> Result<Hydration, SessionError> {
        let stored = match self.bridge.load()? {
            LoadOutcome::Empty => return Ok(Hydration::Fresh),
            LoadOutcome::Discarded(err) => return Ok(Hydration::Discarded(err)),
            LoadOutcome::Restored(stored) => stored,
        };

        self.state = SessionState::initial();
        if let Some(user) = stored.user {
            self.apply(Action::SetUser(user))?;
        }
        if let Some(seller) = stored.seller {
            self.apply(Action::SetSeller(seller))?;
        }

        let mut dropped_products = 0;
        for product in stored.products {
            match self.apply(Action::AddProduct(product)) {
                Ok(()) => {}
                Err(SessionError::CapacityExceeded { .. }) => dropped_products += 1,
                Err(e) => return Err(e),
            }
        }
        if dropped_products > 0 {
            tracing::warn!(
                dropped = dropped_products,
                maximum = self.capacity.maximum(),
                "Persisted session held more products than allowed"
            );
        }

        self.apply(Action::SetStep(stored.current_step))?;
        self.apply(Action::SetSubmitting(stored.is_submitting))?;
        self.bridge.save(&self.state)?;

        tracing::info!(
            step = %self.state.current_step,
            products = self.state.products.len(),
            "Restored persisted session"
        );
        Ok(Hydration::Restored { dropped_products })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::SESSION_KEY;

    fn capacity() -> Capacity {
        Capacity::new(2, 5).unwrap()
    }

    fn product(name: &str) -> ProductDraft {
        ProductDraft {
            name: Some(name.to_string()),
            mrp: Some(10.0),
            msp: Some(8.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_run_is_initial() {
        let store = MemoryKeyValueStore::new();
        let (session, hydration) = FormSession::open(&store, capacity()).unwrap();
        assert!(matches!(hydration, Hydration::Fresh));
        assert_eq!(session.state(), &SessionState::initial());
        assert_eq!(session.state().current_step, Step::Auth);
    }

    #[test]
    fn test_dispatch_persists_every_transition() {
        let store = MemoryKeyValueStore::new();
        let (mut session, _) = FormSession::open(&store, capacity()).unwrap();

        session
            .dispatch(Action::SetUser(UserDraft {
                id: Some("u1".to_string()),
                ..Default::default()
            }))
            .unwrap();
        let bridge = PersistenceBridge::new(&store);
        match bridge.load().unwrap() {
            LoadOutcome::Restored(saved) => assert_eq!(saved.user_id(), Some("u1")),
            other => panic!("unexpected outcome {:?}", other),
        }

        session.dispatch(Action::SetStep(Step::Seller)).unwrap();
        match bridge.load().unwrap() {
            LoadOutcome::Restored(saved) => assert_eq!(saved.current_step, Step::Seller),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_capacity_boundary() {
        let store = MemoryKeyValueStore::new();
        let (mut session, _) = FormSession::open(&store, capacity()).unwrap();
        for i in 0..5 {
            session
                .dispatch(Action::AddProduct(product(&format!("p{}", i))))
                .unwrap();
        }

        let err = session.dispatch(Action::AddProduct(product("p5"))).unwrap_err();
        assert!(matches!(err, SessionError::CapacityExceeded { maximum: 5 }));
        assert_eq!(session.state().products.len(), 5);
    }

    #[test]
    fn test_invalid_index_leaves_state() {
        let store = MemoryKeyValueStore::new();
        let (mut session, _) = FormSession::open(&store, capacity()).unwrap();
        session.dispatch(Action::AddProduct(product("a"))).unwrap();
        let before = session.state().clone();

        let err = session.dispatch(Action::RemoveProduct(7)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidIndex { .. }));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_reopen_restores_state() {
        let store = MemoryKeyValueStore::new();
        let expected = {
            let (mut session, _) = FormSession::open(&store, capacity()).unwrap();
            session
                .dispatch(Action::SetUser(UserDraft {
                    id: Some("u1".to_string()),
                    name: Some("Alice".to_string()),
                    ..Default::default()
                }))
                .unwrap();
            session
                .dispatch(Action::SetSeller(SellerDraft {
                    id: Some("s1".to_string()),
                    ..Default::default()
                }))
                .unwrap();
            session.dispatch(Action::AddProduct(product("a"))).unwrap();
            session.dispatch(Action::AddProduct(product("b"))).unwrap();
            session.dispatch(Action::SetStep(Step::Products)).unwrap();
            session.state().clone()
        };

        let (session, hydration) = FormSession::open(&store, capacity()).unwrap();
        assert!(matches!(
            hydration,
            Hydration::Restored {
                dropped_products: 0
            }
        ));
        assert_eq!(session.state(), &expected);
    }

    #[test]
    fn test_rehydration_does_not_duplicate_products() {
        let store = MemoryKeyValueStore::new();
        {
            let (mut session, _) = FormSession::open(&store, capacity()).unwrap();
            session.dispatch(Action::AddProduct(product("a"))).unwrap();
        }
        for _ in 0..3 {
            let (session, _) = FormSession::open(&store, capacity()).unwrap();
            assert_eq!(session.state().products.len(), 1);
        }
    }

    #[test]
    fn test_hydration_enforces_capacity() {
        let store = MemoryKeyValueStore::new();
        let oversized = SessionState {
            products: (0..8).map(|i| product(&format!("p{}", i))).collect(),
            ..Default::default()
        };
        PersistenceBridge::new(&store).save(&oversized).unwrap();

        let (session, hydration) = FormSession::open(&store, capacity()).unwrap();
        assert!(matches!(
            hydration,
            Hydration::Restored {
                dropped_products: 3
            }
        ));
        assert_eq!(session.state().products.len(), 5);
        assert_eq!(session.state().products[4].name.as_deref(), Some("p4"));
    }

    #[test]
    fn test_corrupt_state_starts_fresh() {
        let store = MemoryKeyValueStore::new();
        store.set(SESSION_KEY, "][").unwrap();

        let (session, hydration) = FormSession::open(&store, capacity()).unwrap();
        assert!(matches!(
            hydration,
            Hydration::Discarded(SessionError::CorruptPersistedState(_))
        ));
        assert_eq!(session.state(), &SessionState::initial());
        assert!(store.get(SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn test_dispatch_json_unknown_action() {
        let store = MemoryKeyValueStore::new();
        let (mut session, _) = FormSession::open(&store, capacity()).unwrap();
        let err = session
            .dispatch_json(r#"{"type":"SET_LOCALE","payload":"en"}"#)
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownAction(_)));
        assert_eq!(session.state(), &SessionState::initial());
    }

    #[test]
    fn test_reset_clears_persisted_fields() {
        let store = MemoryKeyValueStore::new();
        let (mut session, _) = FormSession::open(&store, capacity()).unwrap();
        session.dispatch(Action::AddProduct(product("a"))).unwrap();
        session.dispatch(Action::SetSubmitting(true)).unwrap();
        session.reset().unwrap();

        let (reopened, _) = FormSession::open(&store, capacity()).unwrap();
        assert_eq!(reopened.state(), &SessionState::initial());
    }

    /// Accepts writes until `fail` is set
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryKeyValueStore,
        fail: std::sync::atomic::AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), SessionError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_save_rolls_back_transition() {
        let store = FlakyStore::default();
        let (mut session, _) = FormSession::open(&store, capacity()).unwrap();
        session.dispatch(Action::AddProduct(product("a"))).unwrap();
        let before = session.state().clone();

        store.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        let err = session
            .dispatch(Action::SetUser(UserDraft {
                id: Some("u1".to_string()),
                ..Default::default()
            }))
            .unwrap_err();
        assert!(matches!(err, SessionError::Storage(_)));
        assert_eq!(session.state(), &before);

        store.fail.store(false, std::sync::atomic::Ordering::SeqCst);
        let (reopened, _) = FormSession::open(&store, capacity()).unwrap();
        assert_eq!(reopened.state(), &before);
    }
}
