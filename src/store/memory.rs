use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use super::ClientStore;
use crate::error::SessionResult;

/// Process-local store. Clones share the same map, so a test can keep a
/// handle and inspect what the session wrote.
#[derive(Clone, Default)]
pub struct MemoryStore {
    map: Arc<RwLock<HashMap<String, JsonValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.map.read().len() }
    pub fn is_empty(&self) -> bool { self.map.read().is_empty() }
    /// Return a snapshot of all keys in this store
    pub fn keys(&self) -> Vec<String> { self.map.read().keys().cloned().collect() }
    pub fn clear(&self) { self.map.write().clear(); }
}

impl ClientStore for MemoryStore {
    fn get(&self, key: &str) -> Option<JsonValue> {
        self.map.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: JsonValue) -> SessionResult<()> {
        self.map.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> SessionResult<bool> {
        Ok(self.map.write().remove(key).is_some())
    }
}
