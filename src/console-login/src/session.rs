//! Session scoped key/value storage.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::constants::AUTH_CALLBACK_URL_PREFIX;

/// Browser session storage, or anything that behaves like it.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-process session storage.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

fn callback_key(app: &str) -> String {
    format!("{}{}", AUTH_CALLBACK_URL_PREFIX, app)
}

/// Remember where to return to after the sign-in redirect.
pub fn set_authentication_callback_url(store: &dyn SessionStore, app: &str, url: &str) {
    store.set(&callback_key(app), url);
}

pub fn authentication_callback_url(store: &dyn SessionStore, app: &str) -> Option<String> {
    store.get(&callback_key(app))
}

pub fn remove_authentication_callback_url(store: &dyn SessionStore, app: &str) {
    store.remove(&callback_key(app));
}

/// The stored callback URL already points below `tenant_path`.
pub fn is_valid_authentication_callback_url(
    store: &dyn SessionStore,
    app: &str,
    tenant_path: &str,
) -> bool {
    authentication_callback_url(store, app)
        .is_some_and(|url| !tenant_path.is_empty() && url.contains(tenant_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        store.set("session_state", "abc");
        assert_eq!(store.get("session_state").as_deref(), Some("abc"));

        store.remove("session_state");
        assert!(store.get("session_state").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_callback_url_keyed_by_app() {
        let store = MemorySessionStore::new();
        set_authentication_callback_url(&store, "CONSOLE", "/t/wso2.com/console/applications");

        assert_eq!(
            store.snapshot().keys().collect::<Vec<_>>(),
            vec!["auth_callback_url_CONSOLE"]
        );
        assert!(is_valid_authentication_callback_url(&store, "CONSOLE", "/t/wso2.com"));
        assert!(!is_valid_authentication_callback_url(&store, "CONSOLE", "/t/other.com"));
        assert!(!is_valid_authentication_callback_url(&store, "MYACCOUNT", "/t/wso2.com"));

        remove_authentication_callback_url(&store, "CONSOLE");
        assert!(authentication_callback_url(&store, "CONSOLE").is_none());
    }
}
