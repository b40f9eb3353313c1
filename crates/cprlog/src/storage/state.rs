//! Best-effort persistence of recorder state.
//!
//! The store is a convenience cache, not a system of record: nothing here
//! returns an error. A failed or unparseable read yields the fallback value;
//! a failed write is logged and dropped.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::KeyValueStore;

/// Key of the patient metadata blob.
pub const META_KEY: &str = "cpr.meta";

/// Key of the session blob.
pub const SESSION_KEY: &str = "cpr.session";

/// Wraps a [`KeyValueStore`] so that loads and saves never fail.
#[derive(Debug)]
pub struct StateStore<S> {
    inner: S,
}

impl<S: KeyValueStore> StateStore<S> {
    /// Wrap a store.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Load `key`, or `T::default()` if it is missing or unreadable.
    pub fn load_or_default<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.load_or_else(key, T::default)
    }

    /// Load `key`, or the value produced by `fallback`.
    pub fn load_or_else<T, F>(&self, key: &str, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let raw = match self.inner.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no stored value, using default");
                return fallback();
            }
            Err(e) => {
                warn!(key, error = %e, "failed to read stored value, using default");
                return fallback();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "stored value is malformed, using default");
                fallback()
            }
        }
    }

    /// Serialize and write `value` under `key`. Failures are logged only.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize value, not saved");
                return;
            }
        };
        if let Err(e) = self.inner.put(key, &raw) {
            warn!(key, error = %e, "failed to save value");
        }
    }

    /// Delete `key`. Failures are logged only.
    pub fn clear(&self, key: &str) {
        if let Err(e) = self.inner.remove(key) {
            warn!(key, error = %e, "failed to delete stored value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::patient::PatientMeta;
    use crate::session::Session;
    use crate::storage::Storage;

    /// A store where every call fails.
    #[derive(Debug, Default)]
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Io(std::io::Error::other("disk on fire")))
        }

        fn put(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::other("disk on fire")))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::other("disk on fire")))
        }
    }

    fn memory_store() -> StateStore<Storage> {
        crate::logging::init_test_logging();
        StateStore::new(Storage::open_in_memory().unwrap())
    }

    #[test]
    fn test_missing_key_gives_default() {
        let store = memory_store();
        let session: Session = store.load_or_default(SESSION_KEY);
        assert_eq!(session, Session::default());
    }

    #[test]
    fn test_save_then_load() {
        let store = memory_store();
        let mut meta = PatientMeta::default();
        meta.patient_id = "MRN-42".to_string();
        store.save(META_KEY, &meta);

        let loaded: PatientMeta = store.load_or_default(META_KEY);
        assert_eq!(loaded, meta);
    }

    #[test]
    fn test_malformed_value_gives_fallback() {
        let store = memory_store();
        store.inner().put(SESSION_KEY, "{not json").unwrap();
        let session: Session = store.load_or_default(SESSION_KEY);
        assert!(session.events.is_empty());

        let meta: PatientMeta =
            store.load_or_else(SESSION_KEY, || PatientMeta::with_location("ICU"));
        assert_eq!(meta.location, "ICU");
    }

    #[test]
    fn test_clear_removes_value() {
        let store = memory_store();
        store.save(SESSION_KEY, &Session::default());
        store.clear(SESSION_KEY);
        assert!(store.inner().get(SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn test_broken_store_never_fails() {
        crate::logging::init_test_logging();
        let store = StateStore::new(BrokenStore);
        let session: Session = store.load_or_default(SESSION_KEY);
        assert_eq!(session, Session::default());
        store.save(SESSION_KEY, &session);
        store.clear(SESSION_KEY);
    }
}
