use parking_lot::RwLock;

use crate::types::{CategoryFilter, Coordinate, FilterSnapshot};

/// Last category filters fetched for a location, plus the device's latest
/// known location.
///
/// Filters and their capture location sit behind one lock so they are always
/// replaced and read as a pair. The current location is tracked on its own
/// and never invalidates the captured filters.
#[derive(Debug, Default)]
pub struct DynamicFilterCache {
    captured: RwLock<Option<FilterSnapshot>>,
    current_location: RwLock<Option<Coordinate>>,
}

impl DynamicFilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached filters and capture location.
    ///
    /// `None` means the fetch failed: the previous pair is kept.
    pub fn cache_filter(&self, filters: Option<Vec<CategoryFilter>>, location: Coordinate) {
        let Some(filters) = filters else {
            tracing::debug!("no filters to cache, keeping previous capture");
            return;
        };

        tracing::debug!(
            count = filters.len(),
            latitude = location.latitude,
            longitude = location.longitude,
            "caching category filters"
        );
        *self.captured.write() = Some(FilterSnapshot { filters, location });
    }

    /// Last cached filters, empty if nothing was cached yet.
    pub fn get_filter_cache(&self) -> Vec<CategoryFilter> {
        self.captured
            .read()
            .as_ref()
            .map(|snapshot| snapshot.filters.clone())
            .unwrap_or_default()
    }

    pub fn last_capture_location(&self) -> Option<Coordinate> {
        self.captured.read().as_ref().map(|snapshot| snapshot.location)
    }

    pub fn current_location(&self) -> Option<Coordinate> {
        *self.current_location.read()
    }

    pub fn set_current_location(&self, location: Option<Coordinate>) {
        *self.current_location.write() = location;
    }
}
