use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::types::{CategoryFilter, Coordinate, GasStation};

const MAX_CONSECUTIVE_FAILURES: usize = 3;
const COOLDOWN_DURATION: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),
    #[error("POI service marked unavailable, waiting for cooldown")]
    CircuitOpen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceStatus {
    Available,
    Unavailable,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Available => "AVAILABLE",
            SourceStatus::Unavailable => "UNAVAILABLE",
        }
    }
}

/// Authoritative source of POI data that the caches sit in front of.
pub trait PoiSource: Send + Sync + 'static {
    fn fetch_stations(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<GasStation>, UpstreamError>> + Send;

    /// Categories relevant around `location`.
    fn fetch_categories(
        &self,
        location: Coordinate,
    ) -> impl Future<Output = Result<Vec<CategoryFilter>, UpstreamError>> + Send;

    fn status(&self) -> SourceStatus {
        SourceStatus::Available
    }
}

/// HTTP client for the POI network service with circuit breaker logic
pub struct PoiNetworkClient {
    base_url: String,
    client: reqwest::Client,
    state: RwLock<BreakerState>,
    consecutive_failures: AtomicUsize,
    cooldown: Duration,
}

#[derive(Debug, Clone)]
struct BreakerState {
    status: SourceStatus,
    last_failure_time: Option<Instant>,
}

impl PoiNetworkClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            state: RwLock::new(BreakerState {
                status: SourceStatus::Available,
                last_failure_time: None,
            }),
            consecutive_failures: AtomicUsize::new(0),
            cooldown: COOLDOWN_DURATION,
        })
    }

    #[cfg(test)]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Whether a call may go out. An unavailable service gets a trial call
    /// once the cooldown since its last failure has passed.
    pub fn is_available(&self) -> bool {
        let state = self.state.read();
        match state.status {
            SourceStatus::Available => true,
            SourceStatus::Unavailable => state
                .last_failure_time
                .is_none_or(|last_failure| last_failure.elapsed() >= self.cooldown),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        if !self.is_available() {
            return Err(UpstreamError::CircuitOpen);
        }

        match self.get_json_internal(path, query).await {
            Ok(body) => {
                self.mark_success();
                Ok(body)
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "POI service call failed");
                self.mark_failure();
                Err(e)
            }
        }
    }

    async fn get_json_internal<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    fn mark_success(&self) {
        self.consecutive_failures.swap(0, Ordering::SeqCst);
        let mut state = self.state.write();
        if state.status == SourceStatus::Unavailable {
            tracing::info!("POI service available again");
            state.status = SourceStatus::Available;
            state.last_failure_time = None;
        }
    }

    fn mark_failure(&self) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;

        if failures >= MAX_CONSECUTIVE_FAILURES {
            let mut state = self.state.write();
            if state.status == SourceStatus::Available {
                tracing::warn!(failures, "marking POI service unavailable");
            }
            // a failed trial call restarts the cooldown
            state.status = SourceStatus::Unavailable;
            state.last_failure_time = Some(Instant::now());
        }
    }
}

impl PoiSource for PoiNetworkClient {
    async fn fetch_stations(&self, ids: &[String]) -> Result<Vec<GasStation>, UpstreamError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(count = ids.len(), "fetching stations from POI service");
        self.get_json("stations", &[("ids", ids.join(","))]).await
    }

    async fn fetch_categories(
        &self,
        location: Coordinate,
    ) -> Result<Vec<CategoryFilter>, UpstreamError> {
        self.get_json(
            "categories",
            &[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
            ],
        )
        .await
    }

    fn status(&self) -> SourceStatus {
        self.state.read().status
    }
}
