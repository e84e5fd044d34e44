use serde::{Deserialize, Serialize};

/// Geographic position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Gas station POI as returned by the POI network service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasStation {
    /// Station identifier, the cache key.
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    pub coordinate: Coordinate,

    #[serde(default)]
    pub fuel_prices: Vec<FuelPrice>,

    /// Whether the station accepts in-app payment at the pump.
    #[serde(default)]
    pub is_connected_fueling_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelPrice {
    pub fuel_type: String,
    pub price: f64,
    pub currency: String,
}

/// Category selector constraining which POI types a location query returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub id: String,
    pub name: String,
}

/// Filters as captured together with the location they were fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSnapshot {
    pub filters: Vec<CategoryFilter>,
    pub location: Coordinate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_station_from_upstream_json() {
        let json = serde_json::json!({
            "id": "st-1",
            "name": "Main Street",
            "coordinate": {"latitude": 49.01, "longitude": 8.40},
            "fuelPrices": [{"fuelType": "diesel", "price": 1.659, "currency": "EUR"}],
            "isConnectedFuelingAvailable": true
        });

        let station: GasStation = serde_json::from_value(json).unwrap();

        assert_eq!(station.id, "st-1");
        assert_eq!(station.address, None);
        assert_eq!(station.coordinate, Coordinate::new(49.01, 8.40));
        assert_eq!(station.fuel_prices[0].fuel_type, "diesel");
        assert!(station.is_connected_fueling_available);
    }

    #[test]
    fn test_gas_station_optional_fields_default() {
        let json = serde_json::json!({
            "id": "st-2",
            "name": "Ring Road",
            "coordinate": {"latitude": 0.0, "longitude": 0.0}
        });

        let station: GasStation = serde_json::from_value(json).unwrap();

        assert!(station.fuel_prices.is_empty());
        assert!(!station.is_connected_fueling_available);
    }
}
