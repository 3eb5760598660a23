//! Keyed memo cache.
//!
//! Used for lookups that are expensive to repeat and rarely change during a session:
//! patient display names for queue rows, batch options per (location, item).
//!
//! Invalidation is explicit and manual: pass `force_refresh`, call
//! [`KeyedCache::invalidate`] for one key, or [`KeyedCache::clear`] for all.

use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;

use dashmap::DashMap;
use tracing::trace;

pub struct KeyedCache<K, V> {
    name: &'static str,
    entries: DashMap<K, V>,
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Returns the cached value or fetches and stores it.
    ///
    /// With `force_refresh` the cache is bypassed and overwritten. Failed fetches are
    /// not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, force_refresh: bool, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if !force_refresh {
            if let Some(value) = self.get(&key) {
                trace!(cache = self.name, ?key, "Hit");
                return Ok(value);
            }
        }
        trace!(cache = self.name, ?key, force_refresh, "Fetch");
        let value = fetch().await?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
