//! Key-value storage capability.
//!
//! Browser storage (tab-scoped session storage, origin-scoped local storage,
//! cookies) is reached only through [`KeyValueStorage`], so the session
//! logic runs against [`MemoryStorage`] in tests and against a real binding
//! in the host.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Synchronous string storage with get/set/remove.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of every entry, for asserting on storage contents.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries.lock().clone()
    }
}

impl KeyValueStorage for MemoryStorage {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        storage.set("token", "abc");
        assert_eq!(storage.get("token").as_deref(), Some("abc"));
        assert!(storage.contains("token"));
        storage.remove("token");
        assert!(!storage.contains("token"));
        storage.remove("token");
        assert_eq!(storage.len(), 0);
    }
}
