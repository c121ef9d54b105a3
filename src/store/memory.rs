use super::KeyValueStore;
use crate::error::StoreError;
use std::collections::HashMap;

/// In-process slots, gone when dropped. Used for tests and `backend = "memory"`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
