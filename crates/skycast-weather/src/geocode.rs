//! Reverse geocoding: convert coordinates to human-readable place names.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use skycast_core::WeatherConfig;

use crate::error::WeatherError;
use crate::types::Coordinates;

const USER_AGENT: &str = concat!("SkyCast/", env!("CARGO_PKG_VERSION"));

/// Names a location from its coordinates.
///
/// Resolution is best effort. `None` tells the caller to fall back to
/// showing the coordinates themselves.
#[async_trait]
pub trait LocationNameResolver: Send + Sync {
    async fn resolve_name(&self, coordinates: Coordinates) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state_district: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// "Place, State" or "Place, Country", falling back to just the place.
    fn display_name(self) -> Option<String> {
        let state = self.state.clone().filter(|s| !s.is_empty());
        let country = self.country.clone().filter(|c| !c.is_empty());

        // Prefer city > town > village > municipality for the primary place name
        let place = self
            .city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .or(self.state_district)
            .or(self.county)
            .or(self.state)
            .or(self.country)
            .filter(|p| !p.is_empty())?;

        let suffix = state
            .filter(|s| *s != place)
            .or_else(|| country.filter(|c| *c != place));

        Some(match suffix {
            Some(s) => format!("{}, {}", place, s),
            None => place,
        })
    }
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.geocoding_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LocationNameResolver for NominatimGeocoder {
    async fn resolve_name(&self, coordinates: Coordinates) -> Option<String> {
        let url = format!("{}/reverse", self.base_url);

        let response = match self
            .client
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("layer", "address".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let name = body.address?.display_name()?;
        tracing::info!("Reverse geocoded {} to: {}", coordinates, name);
        Some(name)
    }
}
