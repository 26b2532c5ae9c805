use std::rc::Rc;

use plantshout_shared::{STORAGE_TOKEN_KEY, STORAGE_USER_ID_KEY, Session};
use tracing::{debug, warn};

use super::observer::{ListenerSet, Subscription};
use super::storage::KeyValueStorage;
use crate::error::ClientResult;

/// Where a session change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A write made through this store (this tab).
    Local,
    /// A storage-change notification from another tab.
    External,
}

/// Announced to subscribers after every write and every external notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    /// The session as read back from storage after the change.
    pub session: Option<Session>,
    pub origin: ChangeOrigin,
}

/// Whether a storage-change key can affect the session.
///
/// `None` is what the browser reports for `localStorage.clear()`.
pub fn is_session_key(key: Option<&str>) -> bool {
    match key {
        None => true,
        Some(key) => key == STORAGE_TOKEN_KEY || key == STORAGE_USER_ID_KEY,
    }
}

/// Owns the persisted session credentials.
///
/// The two keys are written in an order that keeps every intermediate state a
/// partial pair, and a partial pair always reads back as "no session". A reader
/// in another tab therefore sees either the old session, the new one, or none.
#[derive(Clone)]
pub struct SessionStore {
    storage: Rc<dyn KeyValueStorage>,
    listeners: Rc<ListenerSet<SessionChange>>,
}

impl SessionStore {
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        Self {
            storage: Rc::new(storage),
            listeners: ListenerSet::new(),
        }
    }

    /// Reads the current session. Storage failures read as signed out.
    pub fn get(&self) -> Option<Session> {
        match self.read() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "session read failed, treating as signed out");
                None
            }
        }
    }

    fn read(&self) -> ClientResult<Option<Session>> {
        let token = self.storage.get(STORAGE_TOKEN_KEY)?;
        let user_id = self.storage.get(STORAGE_USER_ID_KEY)?;

        match (token, user_id) {
            (Some(token), Some(user_id)) if !token.is_empty() && !user_id.is_empty() => {
                Ok(Some(Session { token, user_id }))
            }
            (None, None) => Ok(None),
            _ => {
                debug!("partial session in storage, ignoring");
                Ok(None)
            }
        }
    }

    /// Persists both fields, then notifies subscribers.
    ///
    /// The old token is removed before the new `user_id` lands, so an old token
    /// is never paired with a new user id.
    pub fn set(&self, session: &Session) -> ClientResult<()> {
        self.storage.remove(STORAGE_TOKEN_KEY)?;
        self.storage.set(STORAGE_USER_ID_KEY, &session.user_id)?;
        if let Err(e) = self.storage.set(STORAGE_TOKEN_KEY, &session.token) {
            // 回滚，避免遗留只有 user_id 的残缺会话
            let _ = self.storage.remove(STORAGE_USER_ID_KEY);
            return Err(e);
        }
        debug!(user_id = %session.user_id, "session stored");
        self.announce(ChangeOrigin::Local);
        Ok(())
    }

    /// Removes both fields, then notifies subscribers.
    ///
    /// Subscribers are notified even when a removal fails, with whatever
    /// session is still readable.
    pub fn clear(&self) -> ClientResult<()> {
        let token = self.storage.remove(STORAGE_TOKEN_KEY);
        let user_id = self.storage.remove(STORAGE_USER_ID_KEY);
        debug!("session cleared");
        self.announce(ChangeOrigin::Local);
        token.and(user_id)
    }

    /// Entry point for cross-tab notifications.
    ///
    /// Returns `false` when the key is unrelated to the session.
    pub fn sync_external(&self, key: Option<&str>) -> bool {
        if !is_session_key(key) {
            return false;
        }
        debug!(key = ?key, "session changed in another tab");
        self.announce(ChangeOrigin::External);
        true
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionChange) + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    fn announce(&self, origin: ChangeOrigin) {
        let change = SessionChange {
            session: self.get(),
            origin,
        };
        self.listeners.emit(&change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;
    use std::cell::RefCell;

    fn store() -> (MemoryStorage, SessionStore) {
        let storage = MemoryStorage::new();
        (storage.clone(), SessionStore::new(storage))
    }

    #[test]
    fn empty_at_first_load() {
        let (_, store) = store();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn set_writes_both_keys() {
        let (storage, store) = store();
        store.set(&Session::new("T1", "42")).unwrap();
        assert_eq!(storage.raw("token").as_deref(), Some("T1"));
        assert_eq!(storage.raw("user_id").as_deref(), Some("42"));
        assert_eq!(store.get(), Some(Session::new("T1", "42")));
    }

    #[test]
    fn clear_removes_both_keys() {
        let (storage, store) = store();
        store.set(&Session::new("T1", "42")).unwrap();
        store.clear().unwrap();
        assert_eq!(storage.raw("token"), None);
        assert_eq!(storage.raw("user_id"), None);
        assert_eq!(store.get(), None);
    }

    #[test]
    fn partial_pair_reads_as_signed_out() {
        let (storage, store) = store();
        storage.put_raw("token", "T1");
        assert_eq!(store.get(), None);

        storage.remove_raw("token");
        storage.put_raw("user_id", "42");
        assert_eq!(store.get(), None);
    }

    #[test]
    fn empty_token_reads_as_signed_out() {
        let (storage, store) = store();
        storage.put_raw("token", "");
        storage.put_raw("user_id", "42");
        assert_eq!(store.get(), None);
    }

    #[test]
    fn read_failure_fails_closed() {
        let (storage, store) = store();
        store.set(&Session::new("T1", "42")).unwrap();
        storage.fail_reads(true);
        assert_eq!(store.get(), None);
    }

    #[test]
    fn failed_token_write_rolls_back_user_id() {
        let (storage, store) = store();
        storage.fail_writes_for(Some("token"));
        assert!(store.set(&Session::new("T1", "42")).is_err());
        assert_eq!(storage.raw("user_id"), None);
        assert_eq!(storage.raw("token"), None);
    }

    #[test]
    fn overwrite_never_exposes_a_mixed_pair() {
        let (storage, store) = store();
        store.set(&Session::new("T1", "42")).unwrap();
        storage.record_snapshots();

        store.set(&Session::new("T2", "43")).unwrap();

        let snapshots = storage.snapshots();
        let (last, intermediate) = snapshots.split_last().unwrap();
        assert_eq!(last, &(Some("T2".to_string()), Some("43".to_string())));
        for (token, user_id) in intermediate {
            assert!(
                token.is_none() || user_id.is_none(),
                "complete pair ({token:?}, {user_id:?}) visible mid-write"
            );
        }
    }

    #[test]
    fn subscribers_see_local_writes() {
        let (_, store) = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            store.subscribe(move |c| seen.borrow_mut().push(c.clone()))
        };

        store.set(&Session::new("T1", "42")).unwrap();
        store.clear().unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].session, Some(Session::new("T1", "42")));
        assert_eq!(seen[0].origin, ChangeOrigin::Local);
        assert_eq!(seen[1].session, None);
    }

    #[test]
    fn external_sync_rereads_storage() {
        let (storage, store) = store();
        store.set(&Session::new("T1", "42")).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            store.subscribe(move |c| seen.borrow_mut().push(c.clone()))
        };

        // 另一个标签页登出
        storage.remove_raw("token");
        storage.remove_raw("user_id");
        assert!(store.sync_external(Some("token")));

        let seen = seen.borrow();
        assert_eq!(
            seen.as_slice(),
            &[SessionChange {
                session: None,
                origin: ChangeOrigin::External,
            }]
        );
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let (_, store) = store();
        let calls = Rc::new(RefCell::new(0));
        let _sub = {
            let calls = calls.clone();
            store.subscribe(move |_| *calls.borrow_mut() += 1)
        };
        assert!(!store.sync_external(Some("plantshout_api_url")));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn session_key_filter() {
        assert!(is_session_key(None));
        assert!(is_session_key(Some("token")));
        assert!(is_session_key(Some("user_id")));
        assert!(!is_session_key(Some("theme")));
    }
}
