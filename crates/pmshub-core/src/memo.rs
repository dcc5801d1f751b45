//! Version-keyed memoization.
//!
//! Metric results and filtered views are pure functions of a dataset version
//! and a request. [`VersionedMemo`] caches them per key and drops every entry
//! as soon as a newer dataset version is seen, so a stale value can never be
//! served after a load.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute.
    pub misses: u64,
    /// Entries currently held.
    pub entries: usize,
    /// Dataset version the entries belong to.
    pub version: u64,
}

#[derive(Debug)]
struct MemoState<K, V> {
    version: u64,
    entries: HashMap<K, Arc<V>>,
    hits: u64,
    misses: u64,
}

/// Thread-safe memo keyed by `(dataset version, K)`.
#[derive(Debug)]
pub struct VersionedMemo<K, V> {
    state: RwLock<MemoState<K, V>>,
    capacity: usize,
}

impl<K, V> VersionedMemo<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a memo holding at most `capacity` entries per version.
    ///
    /// A capacity of zero disables caching.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            state: RwLock::new(MemoState {
                version: 0,
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
            capacity,
        }
    }

    /// Returns the cached value for `key` at `version`, computing it on a miss.
    pub fn get_or_compute<F>(&self, version: u64, key: &K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        match self.try_get_or_compute(version, key, || Ok::<V, std::convert::Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`get_or_compute`](Self::get_or_compute).
    ///
    /// Errors are returned to the caller and not cached.
    pub fn try_get_or_compute<F, E>(&self, version: u64, key: &K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        {
            let state = self.state.read();
            if state.version == version {
                if let Some(value) = state.entries.get(key) {
                    let value = Arc::clone(value);
                    drop(state);
                    self.state.write().hits += 1;
                    return Ok(value);
                }
            }
        }

        let value = Arc::new(compute()?);

        let mut state = self.state.write();
        state.misses += 1;
        if version > state.version {
            log::debug!(
                "memo invalidated: version {} -> {} ({} entries dropped)",
                state.version,
                version,
                state.entries.len()
            );
            state.version = version;
            state.entries.clear();
        }
        if version == state.version && self.capacity > 0 {
            if state.entries.len() >= self.capacity {
                state.entries.clear();
            }
            state.entries.insert(key.clone(), Arc::clone(&value));
        }
        Ok(value)
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.state.write().entries.clear();
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> MemoStats {
        let state = self.state.read();
        MemoStats {
            hits: state.hits,
            misses: state.misses,
            entries: state.entries.len(),
            version: state.version,
        }
    }
}

impl<K, V> Default for VersionedMemo<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(1024)
    }
}
