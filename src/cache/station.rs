// parking_lot::RwLock: no poisoning and a smaller lock than std::sync::RwLock

use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::Arc;

use super::{EvictionStore, LruStore, TimedStore};
use crate::config::Config;
use crate::types::GasStation;

type StationStore = dyn EvictionStore<Arc<GasStation>>;

/// Bounded cache of gas station POIs keyed by station id.
///
/// Every call takes the write lock, since reads reorder the store too. A
/// batch call holds it for the whole batch.
pub struct GasStationCache {
    store: RwLock<Box<StationStore>>,
}

impl GasStationCache {
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self::with_store(Box::new(LruStore::new(capacity)))
    }

    pub fn with_store(store: Box<StationStore>) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Plain LRU, or LRU with expiry when a TTL is configured.
    pub fn from_config(config: &Config) -> Self {
        let capacity = config.station_cache_capacity;
        match config.station_cache_ttl {
            Some(ttl) => Self::with_store(Box::new(TimedStore::new(capacity, ttl))),
            None => Self::with_capacity(capacity),
        }
    }

    pub fn put(&self, station: impl Into<Arc<GasStation>>) {
        let mut store = self.store.write();
        insert(&mut **store, station.into());
    }

    /// Stores each station in order; a repeated id keeps the last record.
    pub fn put_all<I>(&self, stations: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<GasStation>>,
    {
        let mut store = self.store.write();
        for station in stations {
            insert(&mut **store, station.into());
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<GasStation>> {
        let mut store = self.store.write();
        store.get(id).cloned()
    }

    /// Cached stations for `ids` in the order given. Misses are skipped.
    pub fn get_all<I, K>(&self, ids: I) -> Vec<Arc<GasStation>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut store = self.store.write();
        ids.into_iter()
            .filter_map(|id| store.get(id.as_ref()).cloned())
            .collect()
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.store.read().contains(id)
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn capacity(&self) -> usize {
        self.store.read().capacity()
    }
}

fn insert(store: &mut StationStore, station: Arc<GasStation>) {
    let id = station.id.clone();
    tracing::trace!(station_id = %id, refresh = store.contains(&id), "caching station");

    if let Some(evicted) = store.insert(id, station) {
        tracing::debug!(station_id = %evicted, "evicted least recently used station");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;
    use std::time::Duration;

    fn station(id: &str) -> GasStation {
        GasStation {
            id: id.to_string(),
            name: format!("Station {}", id),
            address: None,
            coordinate: Coordinate::new(49.0, 8.4),
            fuel_prices: Vec::new(),
            is_connected_fueling_available: true,
        }
    }

    fn cache(capacity: usize) -> GasStationCache {
        GasStationCache::with_capacity(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn test_cache_put_and_get() {
        let cache = cache(10);
        let record = station("st-1");

        cache.put(record.clone());
        let cached = cache.get("st-1");

        assert!(cached.is_some());
        assert_eq!(*cached.unwrap(), record);
    }

    #[test]
    fn test_cache_returns_same_shared_record() {
        let cache = cache(10);
        let record = Arc::new(station("st-1"));

        cache.put(Arc::clone(&record));

        assert!(Arc::ptr_eq(&cache.get("st-1").unwrap(), &record));
    }

    #[test]
    fn test_cache_miss() {
        let cache = cache(10);
        assert!(cache.get("invalid_key").is_none());
    }

    #[test]
    fn test_get_all_skips_misses_in_input_order() {
        let cache = cache(10);
        cache.put(station("B"));

        let found = cache.get_all(["A", "B", "C"]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "B");
    }

    #[test]
    fn test_get_all_preserves_input_order() {
        let cache = cache(10);
        cache.put_all(vec![station("A"), station("B"), station("C")]);

        let ids: Vec<String> = cache
            .get_all(vec!["C".to_string(), "A".to_string(), "B".to_string()])
            .iter()
            .map(|s| s.id.clone())
            .collect();

        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_put_all_later_duplicate_wins() {
        let cache = cache(10);
        let mut renamed = station("A");
        renamed.name = "Renamed".to_string();

        cache.put_all(vec![station("A"), renamed]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("A").unwrap().name, "Renamed");
    }

    #[test]
    fn test_touched_entry_survives_eviction() {
        let cache = cache(2);
        cache.put(station("A"));
        cache.put(station("B"));
        cache.get("A");
        cache.put(station("C"));

        assert!(cache.contains("A"));
        assert!(!cache.contains("B"));
        assert!(cache.contains("C"));
    }

    #[test]
    fn test_full_cache_evicts_oldest_station() {
        let cache = cache(500);
        cache.put_all((0..500).map(|i| station(&format!("st-{}", i))));
        assert_eq!(cache.len(), 500);

        cache.put(station("st-new"));

        assert_eq!(cache.len(), 500);
        assert!(cache.get("st-0").is_none());
        assert!(cache.get("st-new").is_some());
        assert!(cache.get("st-1").is_some());
    }

    #[test]
    fn test_from_config_uses_timed_store_with_ttl() {
        let mut config = Config::default();
        config.station_cache_capacity = NonZeroUsize::new(3).unwrap();
        config.station_cache_ttl = Some(Duration::from_millis(200));

        let cache = GasStationCache::from_config(&config);
        cache.put(station("A"));
        assert!(cache.get("A").is_some());
        assert_eq!(cache.capacity(), 3);

        std::thread::sleep(Duration::from_millis(400));
        assert!(cache.get("A").is_none());
    }

    #[test]
    fn test_refresh_replaces_record_without_growing() {
        let cache = cache(2);
        cache.put(station("A"));
        let mut renamed = station("A");
        renamed.name = "Renamed".to_string();

        cache.put(renamed);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("A").unwrap().name, "Renamed");
    }

    #[test]
    fn test_concurrent_access_keeps_bound() {
        let cache = Arc::new(cache(50));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let id = format!("st-{}-{}", t, i % 80);
                        cache.put(station(&id));
                        cache.get(&id);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 50);

        // index and recency list still agree on what is resident
        let all_ids: Vec<String> = (0..8)
            .flat_map(|t| (0..80).map(move |i| format!("st-{}-{}", t, i)))
            .collect();
        assert_eq!(cache.get_all(&all_ids).len(), 50);

        // and a full round of fresh inserts pushes every old entry out in order
        let fresh: Vec<String> = (0..50).map(|i| format!("fresh-{}", i)).collect();
        for id in &fresh {
            cache.put(station(id));
        }
        assert_eq!(cache.len(), 50);
        assert!(cache.get_all(&all_ids).is_empty());
        assert_eq!(cache.get_all(&fresh).len(), 50);
    }
}
