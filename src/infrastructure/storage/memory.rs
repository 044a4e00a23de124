use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;

use crate::domain::models::KeyValueStore;

/// Non-durable store. Clones share the same entries, so a handle kept outside
/// the session can observe what was written.
#[derive(Default, Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        return self.entries.get(key).map(|val| return val.value().clone());
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        return Ok(());
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        return Ok(());
    }
}
