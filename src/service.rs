use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::cache::GasStationCache;
use crate::filter_cache::DynamicFilterCache;
use crate::types::{CategoryFilter, Coordinate, GasStation};
use crate::upstream::{PoiSource, SourceStatus, UpstreamError};

/// Read-through access to stations and filters: answers from the caches and
/// asks the POI source only for what is missing.
pub struct StationService<S> {
    stations: Arc<GasStationCache>,
    filters: Arc<DynamicFilterCache>,
    source: S,
}

impl<S: PoiSource> StationService<S> {
    pub fn new(stations: Arc<GasStationCache>, filters: Arc<DynamicFilterCache>, source: S) -> Self {
        Self {
            stations,
            filters,
            source,
        }
    }

    /// Stations for `ids` in request order, duplicates collapsed.
    ///
    /// Ids unknown to both the cache and the source are left out. When the
    /// source fails, cached hits are still returned; the error only surfaces
    /// if there was nothing cached to return.
    pub async fn stations(&self, ids: &[String]) -> Result<Vec<Arc<GasStation>>, UpstreamError> {
        let mut seen = HashSet::new();
        let requested: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect();

        let mut found: HashMap<String, Arc<GasStation>> = self
            .stations
            .get_all(&requested)
            .into_iter()
            .map(|station| (station.id.clone(), station))
            .collect();

        let misses: Vec<String> = requested
            .iter()
            .filter(|id| !found.contains_key(**id))
            .map(|id| id.to_string())
            .collect();

        tracing::debug!(
            requested = requested.len(),
            hits = found.len(),
            misses = misses.len(),
            "station lookup"
        );

        if !misses.is_empty() {
            match self.source.fetch_stations(&misses).await {
                Ok(fetched) => {
                    let fetched: Vec<Arc<GasStation>> = fetched.into_iter().map(Arc::new).collect();
                    self.stations.put_all(fetched.iter().cloned());
                    for station in fetched {
                        found.insert(station.id.clone(), station);
                    }
                }
                Err(e) if found.is_empty() => return Err(e),
                Err(e) => {
                    tracing::warn!(error = %e, "POI service failed, returning cached stations only");
                }
            }
        }

        Ok(requested
            .iter()
            .filter_map(|id| found.get(*id).cloned())
            .collect())
    }

    /// Single station: cache hit, or fetched and cached on a miss.
    pub async fn station(&self, id: &str) -> Result<Option<Arc<GasStation>>, UpstreamError> {
        if let Some(station) = self.stations.get(id) {
            return Ok(Some(station));
        }

        let fetched = self.source.fetch_stations(&[id.to_string()]).await?;
        let Some(station) = fetched.into_iter().find(|station| station.id == id) else {
            return Ok(None);
        };

        let station = Arc::new(station);
        self.stations.put(Arc::clone(&station));
        Ok(Some(station))
    }

    /// Refreshes the category filters for `location` and returns what is cached.
    ///
    /// A failed fetch keeps the previous capture, so the result may belong to
    /// an earlier location, or be empty if nothing was ever cached.
    pub async fn filters_near(&self, location: Coordinate) -> Vec<CategoryFilter> {
        self.filters.set_current_location(Some(location));

        let fetched = match self.source.fetch_categories(location).await {
            Ok(filters) => Some(filters),
            Err(e) => {
                tracing::warn!(error = %e, "category fetch failed, keeping cached filters");
                None
            }
        };
        self.filters.cache_filter(fetched, location);

        self.filters.get_filter_cache()
    }

    pub fn set_current_location(&self, location: Option<Coordinate>) {
        self.filters.set_current_location(location);
    }

    pub fn station_cache(&self) -> &GasStationCache {
        &self.stations
    }

    pub fn filter_cache(&self) -> &DynamicFilterCache {
        &self.filters
    }

    pub fn source_status(&self) -> SourceStatus {
        self.source.status()
    }
}
