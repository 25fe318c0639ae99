//! Durable key-value storage shared by every open tab of the map
//!
//! Mirrors the browser's `localStorage`: string keys and values, `&self`
//! access, and a change notification delivered to the *other* documents that
//! share the store.

use crate::prelude::HashMap;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Cross-document change notification. `key` is `None` when the whole store
/// was cleared; `new_value` is `None` when the key was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    pub key: Option<String>,
    pub new_value: Option<String>,
}

impl StorageEvent {
    pub fn new(key: impl Into<String>, new_value: Option<String>) -> Self {
        Self {
            key: Some(key.into()),
            new_value,
        }
    }

    pub fn is_for(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

/// In-memory storage, used headless and in tests.
///
/// Every write that changes a value queues a [`StorageEvent`]; deliver the
/// drained events to the other tabs sharing this store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    pending_events: RefCell<Vec<StorageEvent>>,
    writes: Cell<usize>,
    read_only: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set_item` / `remove_item` calls
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Simulates a full or disabled store: every write fails.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn take_events(&self) -> Vec<StorageEvent> {
        std::mem::take(&mut *self.pending_events.borrow_mut())
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.read_only.get() {
            return Err(MapError::Storage(format!("storage is read-only, cannot write {key}")));
        }
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable(key)?;
        let previous = self
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);

        if previous.as_deref() != Some(value) {
            self.pending_events
                .borrow_mut()
                .push(StorageEvent::new(key, Some(value.to_string())));
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.check_writable(key)?;
        let previous = self.items.borrow_mut().remove(key);
        self.writes.set(self.writes.get() + 1);

        if previous.is_some() {
            self.pending_events
                .borrow_mut()
                .push(StorageEvent::new(key, None));
        }
        Ok(())
    }
}
