mod cache;
mod config;
mod filter_cache;
mod routes;
mod service;
mod types;
mod upstream;

use cache::GasStationCache;
use config::Config;
use filter_cache::DynamicFilterCache;
use routes::AppState;
use service::StationService;
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upstream::PoiNetworkClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // a missing .env file is fine, the process environment still applies
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "station_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting station gateway");

    let config = Config::from_env()?;
    tracing::info!("POI service: {}", config.poi_service_url);
    tracing::info!(
        "Station cache capacity {}, ttl {:?}",
        config.station_cache_capacity,
        config.station_cache_ttl
    );

    // Caches live for the whole process and are handed to whoever needs them
    let stations = Arc::new(GasStationCache::from_config(&config));
    let filters = Arc::new(DynamicFilterCache::new());
    let client = PoiNetworkClient::new(config.poi_service_url.clone(), config.upstream_timeout)?;

    let state = AppState {
        service: Arc::new(StationService::new(stations, filters, client)),
    };

    let app = routes::router(state)
        .layer(ServiceBuilder::new().layer(tower_http::trace::TraceLayer::new_for_http()));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("Listening on http://{}", config.listen_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
