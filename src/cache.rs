//! Bounded caches for parsed queries and compiled schemas.
//!
//! # Thread Safety
//!
//! [`BoundedCache`] is `Send + Sync` when its values are. Entries live behind
//! a `parking_lot::Mutex`; values are handed out as `Arc`s so no lock is held
//! while a caller uses them.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{ast::Operation, schema::SchemaDocument};

/// Query text to parsed operation tree.
pub type QueryCache = BoundedCache<Operation>;

/// Schema text to compiled schema.
pub type SchemaCache = BoundedCache<SchemaDocument>;

struct Entry<V> {
    value: Arc<V>,
    last_used: u64,
}

struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    clock: u64,
}

impl<V> Inner<V> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

/// Least-recently-used map from text to a shared value, holding at most
/// `capacity` entries. A capacity of zero stores nothing.
pub struct BoundedCache<V> {
    capacity: usize,
    inner: Mutex<Inner<V>>,
}

impl<V> std::fmt::Debug for BoundedCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl<V> BoundedCache<V> {
    pub fn new(capacity: usize) -> Self {
        BoundedCache {
            capacity,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                clock: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        let mut inner = self.inner.lock();
        let now = inner.tick();
        let entry = inner.entries.get_mut(key)?;
        entry.last_used = now;
        Some(Arc::clone(&entry.value))
    }

    /// Stores `value` under `key`, evicting the least recently used entry
    /// when full. Returns the shared value either way.
    pub fn insert(&self, key: impl Into<String>, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if self.capacity == 0 {
            return value;
        }

        let key = key.into();
        let mut inner = self.inner.lock();
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            inner.evict_least_recent();
        }
        let last_used = inner.tick();
        inner.entries.insert(
            key,
            Entry {
                value: Arc::clone(&value),
                last_used,
            },
        );
        value
    }

    /// Returns the cached value for `key`, or builds, stores and returns it.
    /// The lock is not held while `build` runs.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &str,
        build: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        Ok(self.insert(key, build()?))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }
}
