//! SharedSieveCache: a SIEVE cache behind one lock, with statistics

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use parking_lot::Mutex;

use crate::error::Result;
use crate::sieve::SieveCache;
use crate::stats::{CacheStats, StatsSnapshot};

/// Thread-safe handle to a [`SieveCache`]
///
/// A single exclusive lock covers the list, the index and the hand, since a
/// lookup writes the visited bit and an insert may run the eviction scan.
/// Cloning the handle shares the same cache.
pub struct SharedSieveCache<K, V> {
    /// SIEVE cache
    cache: Arc<Mutex<SieveCache<K, V>>>,

    /// Cache statistics
    stats: Arc<CacheStats>,

    /// Cache capacity
    capacity: usize,
}

impl<K, V> Clone for SharedSieveCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            stats: Arc::clone(&self.stats),
            capacity: self.capacity,
        }
    }
}

impl<K, V> SharedSieveCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a new shared cache with the given capacity
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of items in cache
    ///
    /// # Returns
    /// * `Result<SharedSieveCache>` - Fails like [`SieveCache::new`]
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            cache: Arc::new(Mutex::new(SieveCache::new(capacity)?)),
            stats: Arc::new(CacheStats::new()),
            capacity,
        })
    }

    /// Put a value into the cache
    ///
    /// # Returns
    /// * `Result<bool>` - `true` if inserted, `false` if the key was only touched
    pub fn put(&self, key: K, value: V) -> Result<bool> {
        let mut cache = self.cache.lock();
        let full = cache.len() >= cache.capacity();

        let inserted = cache.put(key, value)?;
        if inserted {
            if full {
                self.stats.record_eviction();
            }
            self.stats.record_insert();
        } else {
            self.stats.record_touch();
        }

        Ok(inserted)
    }

    /// Get a copy of a cached value
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut cache = self.cache.lock();
        match cache.get(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Check whether a key is cached without marking it visited
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.lock().contains_key(key)
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get a copy of the current statistics
    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Get current cache size
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the cache and reset statistics
    pub fn clear(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
        self.stats.reset();
    }
}
