mod lru;
mod station;
mod timed;

pub use lru::LruStore;
pub use station::GasStationCache;
pub use timed::TimedStore;

/// Bounded key-value store that decides which entry to drop when full.
///
/// Lookups take `&mut self` because a hit counts as an access and may
/// reorder the store. Implementations never hold more than `capacity()`
/// entries.
pub trait EvictionStore<V>: Send + Sync {
    fn get(&mut self, key: &str) -> Option<&V>;

    /// Inserts or replaces `key` and marks it as most recently used.
    ///
    /// Returns the key that was evicted to make room, when the store can tell.
    fn insert(&mut self, key: String, value: V) -> Option<String>;

    /// Presence check that does not count as an access.
    fn contains(&self, key: &str) -> bool;

    fn len(&self) -> usize;

    fn capacity(&self) -> usize;
}
