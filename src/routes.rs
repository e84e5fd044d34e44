use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::service::StationService;
use crate::types::{CategoryFilter, Coordinate, GasStation};
use crate::upstream::{PoiSource, UpstreamError};

pub struct AppState<S> {
    pub service: Arc<StationService<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("station {0} not found")]
    NotFound(String),
    #[error("POI service unavailable: {0}")]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct StationsQuery {
    ids: String,
}

#[derive(Debug, Deserialize)]
struct LocationQuery {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FiltersResponse {
    filters: Vec<CategoryFilter>,
    capture_location: Option<Coordinate>,
}

pub fn router<S: PoiSource>(state: AppState<S>) -> Router {
    Router::new()
        .route("/stations", get(get_stations::<S>))
        .route("/stations/{id}", get(get_station::<S>))
        .route("/filters", get(get_filters::<S>))
        .route("/location", put(put_location::<S>))
        .route("/health", get(health_check))
        .route("/status", get(status_check::<S>))
        .with_state(state)
}

fn validate(location: Coordinate) -> Result<Coordinate, ApiError> {
    let valid = (-90.0..=90.0).contains(&location.latitude)
        && (-180.0..=180.0).contains(&location.longitude);
    if valid {
        Ok(location)
    } else {
        Err(ApiError::BadRequest(format!(
            "coordinate out of range: {}, {}",
            location.latitude, location.longitude
        )))
    }
}

async fn get_stations<S: PoiSource>(
    State(state): State<AppState<S>>,
    Query(query): Query<StationsQuery>,
) -> Result<Json<Vec<Arc<GasStation>>>, ApiError> {
    let ids: Vec<String> = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    if ids.is_empty() {
        return Err(ApiError::BadRequest("no station ids given".to_string()));
    }

    tracing::info!("Received station request: {} ids", ids.len());
    let stations = state.service.stations(&ids).await?;
    Ok(Json(stations))
}

async fn get_station<S: PoiSource>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Arc<GasStation>>, ApiError> {
    let station = state.service.station(&id).await?;
    station.map(Json).ok_or(ApiError::NotFound(id))
}

async fn get_filters<S: PoiSource>(
    State(state): State<AppState<S>>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<FiltersResponse>, ApiError> {
    let location = validate(Coordinate::new(query.latitude, query.longitude))?;

    let filters = state.service.filters_near(location).await;
    let capture_location = state.service.filter_cache().last_capture_location();

    Ok(Json(FiltersResponse {
        filters,
        capture_location,
    }))
}

async fn put_location<S: PoiSource>(
    State(state): State<AppState<S>>,
    Json(location): Json<Option<Coordinate>>,
) -> Result<StatusCode, ApiError> {
    let location = location.map(validate).transpose()?;
    state.service.set_current_location(location);
    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Status check endpoint - returns cache occupancy and POI service status
async fn status_check<S: PoiSource>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let service = &state.service;
    let stations = service.station_cache();
    let filters = service.filter_cache();

    let status_json = serde_json::json!({
        "stationCache": {
            "cached": stations.len(),
            "capacity": stations.capacity(),
        },
        "poiService": service.source_status().as_str(),
        "currentLocation": filters.current_location(),
        "captureLocation": filters.last_capture_location(),
    });

    (StatusCode::OK, Json(status_json))
}
