//! Utility Functions

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

/// Memoizing cache for pure functions of their key.
///
/// Meant to live in a `Lazy` static. Two threads racing on the same key both
/// compute the value and the second insert overwrites the first with an equal
/// value, so no coordination beyond the lock is needed.
pub struct Memo<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Memo {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce(&K) -> V) -> V {
        if let Ok(entries) = self.entries.read() {
            if let Some(value) = entries.get(&key) {
                return value.clone();
            }
        }
        let value = compute(&key);
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, value.clone());
        }
        value
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote a string as a JavaScript/JSON string literal.
pub fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
