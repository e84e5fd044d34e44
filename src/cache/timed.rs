use lru_time_cache::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;

use super::EvictionStore;

/// LruCache with time-based expiration
pub struct TimedStore<V> {
    capacity: NonZeroUsize,
    inner: LruCache<String, V>,
}

impl<V> TimedStore<V> {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            capacity,
            inner: LruCache::with_expiry_duration_and_capacity(ttl, capacity.get()),
        }
    }
}

impl<V: Send + Sync> EvictionStore<V> for TimedStore<V> {
    fn get(&mut self, key: &str) -> Option<&V> {
        self.inner.get(key)
    }

    // lru_time_cache drops its victim silently, so the evicted key is unknown
    fn insert(&mut self, key: String, value: V) -> Option<String> {
        self.inner.insert(key, value);
        None
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn capacity(&self) -> usize {
        self.capacity.get()
    }
}
