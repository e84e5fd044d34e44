use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POI_SERVICE_URL: &str = "http://localhost:9000";
const DEFAULT_STATION_CACHE_CAPACITY: usize = 500;
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub listen_addr: String,
    pub poi_service_url: String,
    pub station_cache_capacity: NonZeroUsize,
    /// Expire cached stations after this long. `None` keeps them until evicted.
    pub station_cache_ttl: Option<Duration>,
    pub upstream_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            poi_service_url: DEFAULT_POI_SERVICE_URL.to_string(),
            station_cache_capacity: NonZeroUsize::new(DEFAULT_STATION_CACHE_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            station_cache_ttl: None,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from `lookup`, falling back to defaults for unset names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let capacity: usize = parse(&lookup, "STATION_CACHE_CAPACITY")?
            .unwrap_or(defaults.station_cache_capacity.get());
        let station_cache_capacity =
            NonZeroUsize::new(capacity).ok_or(ConfigError::Zero("STATION_CACHE_CAPACITY"))?;

        let station_cache_ttl = match parse::<u64, _>(&lookup, "STATION_CACHE_TTL_SECS")? {
            Some(0) => return Err(ConfigError::Zero("STATION_CACHE_TTL_SECS")),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let upstream_timeout = match parse::<u64, _>(&lookup, "UPSTREAM_TIMEOUT_SECS")? {
            Some(0) => return Err(ConfigError::Zero("UPSTREAM_TIMEOUT_SECS")),
            Some(secs) => Duration::from_secs(secs),
            None => defaults.upstream_timeout,
        };

        Ok(Self {
            listen_addr: lookup("GATEWAY_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            poi_service_url: lookup("POI_SERVICE_URL").unwrap_or(defaults.poi_service_url),
            station_cache_capacity,
            station_cache_ttl,
            upstream_timeout,
        })
    }
}

fn parse<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
