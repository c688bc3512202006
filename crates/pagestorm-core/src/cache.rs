// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keyed compute-once cache for generated geometry, layouts, and textures.
//
// Values are pure functions of their keys, so entries are never invalidated.
// Each key owns a slot with its own lock: the first caller builds while
// holding it, and concurrent callers for the same key block until the value
// is published, so every key is built at most once.

use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

/// Lazily populated, read-mostly map from key to immutable value.
pub struct KeyedCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
    built: AtomicUsize,
    hits: AtomicUsize,
}

impl<K: Eq + Hash, V> KeyedCache<K, V> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            built: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        }
    }

    /// Return the cached value for `key`, building it with `build` on first
    /// use. A failed build leaves the slot empty so a later call may retry.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        build: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key).or_default())
        };

        let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = value.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(existing));
        }

        let built = Arc::new(build()?);
        self.built.fetch_add(1, Ordering::Relaxed);
        *value = Some(Arc::clone(&built));
        Ok(built)
    }

    /// Infallible form of [`Self::get_or_try_insert_with`].
    pub fn get_or_insert_with(&self, key: K, build: impl FnOnce() -> V) -> Arc<V> {
        match self.get_or_try_insert_with(key, || Ok::<V, Infallible>(build())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Number of values built so far (cache misses that succeeded).
    pub fn built(&self) -> usize {
        self.built.load(Ordering::Relaxed)
    }

    /// Number of lookups served from an existing entry.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
