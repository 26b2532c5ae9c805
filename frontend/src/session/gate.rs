use std::cell::Cell;
use std::rc::Rc;

use tracing::info;

use super::observer::{ListenerSet, Subscription};
use super::store::{SessionChange, SessionStore};

struct GateState {
    authenticated: Cell<bool>,
    watchers: Rc<ListenerSet<bool>>,
}

impl GateState {
    fn apply(&self, change: &SessionChange) {
        let authenticated = change.session.is_some();
        if self.authenticated.replace(authenticated) != authenticated {
            info!(authenticated, origin = ?change.origin, "auth state changed");
            self.watchers.emit(&authenticated);
        }
    }
}

/// Derived "is authenticated" flag.
///
/// Kept in sync with the [`SessionStore`] through a subscription, so it
/// reflects local writes immediately and other tabs' writes once
/// [`SessionStore::sync_external`] is called.
#[derive(Clone)]
pub struct AuthGate {
    state: Rc<GateState>,
    _link: Rc<Subscription>,
}

impl AuthGate {
    pub fn new(store: &SessionStore) -> Self {
        let state = Rc::new(GateState {
            authenticated: Cell::new(store.get().is_some()),
            watchers: ListenerSet::new(),
        });
        let link = {
            let state = state.clone();
            store.subscribe(move |change| state.apply(change))
        };
        Self {
            state,
            _link: Rc::new(link),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated.get()
    }

    /// Calls `listener` with the new value each time the flag flips.
    pub fn watch(&self, listener: impl Fn(bool) + 'static) -> Subscription {
        self.state.watchers.subscribe(move |v| listener(*v))
    }
}
