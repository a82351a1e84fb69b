//! Weather repository: the single entry point the UI layer talks to.
//!
//! Combines the remote weather source, reverse geocoding and the saved
//! location store. Every failure comes back as a `RepositoryError` value.

use std::sync::Arc;

use chrono::NaiveDate;
use skycast_weather::{
    CoordinateError, Coordinates, CurrentWeatherDetails, HourlyForecast, LocationNameResolver,
    MappingError, PrecipitationProbability, SavedLocation, WeatherError, WeatherSource,
};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::location_backend::{SavedLocationBackend, SavedWeatherLocation, StoreError, Subscription};

/// Namespace for deterministic saved location ids.
const LOCATION_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b7e_93d4_4a58_b0e2_5d7c_1e94_a3f6);

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(#[from] CoordinateError),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Failed to fetch weather: {0}")]
    RemoteFetch(#[from] WeatherError),

    #[error("Failed to map weather data: {0}")]
    Mapping(#[from] MappingError),

    #[error("Saved locations error: {0}")]
    Storage(#[from] StoreError),
}

impl RepositoryError {
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCoordinates(_) => "Those coordinates are not valid.".to_string(),
            Self::InvalidDateRange { .. } => "The forecast dates are not valid.".to_string(),
            Self::RemoteFetch(e) => e.user_message(),
            Self::Mapping(_) => "Weather data could not be displayed.".to_string(),
            Self::Storage(e) => e.user_message().to_string(),
        }
    }
}

/// Stable id for a coordinate pair, so saving the same place twice replaces the first save.
///
/// Coordinates are rounded to four decimal places (about 11 m) first.
pub fn location_id(coordinates: Coordinates) -> String {
    let key = format!(
        "{:.4},{:.4}",
        round_for_id(coordinates.latitude),
        round_for_id(coordinates.longitude)
    );
    Uuid::new_v5(&LOCATION_NAMESPACE, key.as_bytes()).to_string()
}

/// Round to four places, folding -0.0 into 0.0 so both sides of a zero line share an id.
fn round_for_id(value: f64) -> f64 {
    let rounded = (value * 1e4).round() / 1e4;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn to_saved_locations(records: &[SavedWeatherLocation]) -> Vec<SavedLocation> {
    records
        .iter()
        .filter_map(
            |record| match Coordinates::parse(&record.latitude, &record.longitude) {
                Ok(coordinates) => Some(SavedLocation {
                    name_of_location: record.name_of_location.clone(),
                    coordinates,
                }),
                Err(e) => {
                    tracing::warn!("Skipping saved location {}: {}", record.id, e);
                    None
                }
            },
        )
        .collect()
}

pub struct WeatherRepository {
    source: Arc<dyn WeatherSource>,
    names: Arc<dyn LocationNameResolver>,
    store: Arc<dyn SavedLocationBackend>,
}

impl WeatherRepository {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        names: Arc<dyn LocationNameResolver>,
        store: Arc<dyn SavedLocationBackend>,
    ) -> Self {
        Self {
            source,
            names,
            store,
        }
    }

    /// Fetch and map current conditions for a coordinate pair.
    ///
    /// The location is named from the saved list when it was saved before,
    /// otherwise by reverse geocoding, otherwise by its coordinates.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_weather_for_location(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> Result<CurrentWeatherDetails, RepositoryError> {
        let coordinates = Coordinates::parse(latitude, longitude)?;

        let (response, name) = tokio::join!(
            self.source.current_weather(coordinates),
            self.name_for(coordinates)
        );

        let response = response.map_err(|e| {
            tracing::warn!("Current weather fetch failed for {}: {}", coordinates, e);
            e
        })?;

        let details = response
            .to_current_weather_details(&name)
            .map_err(MappingError::from)?;

        tracing::debug!(
            "Mapped current weather for {}: {}",
            details.name_of_location,
            details.weather_condition
        );
        Ok(details)
    }

    async fn name_for(&self, coordinates: Coordinates) -> String {
        match self.store.get(&location_id(coordinates)) {
            Ok(Some(saved)) => return saved.name_of_location,
            Ok(None) => {}
            Err(e) => tracing::warn!("Saved location lookup failed: {}", e),
        }

        self.names
            .resolve_name(coordinates)
            .await
            .unwrap_or_else(|| coordinates.to_string())
    }

    /// Hourly forecast from `start` through `end` inclusive.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_hourly_forecasts(
        &self,
        latitude: &str,
        longitude: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HourlyForecast>, RepositoryError> {
        let coordinates = Coordinates::parse(latitude, longitude)?;
        check_range(start, end)?;

        let response = self.source.hourly_forecast(coordinates, start, end).await?;
        Ok(response.to_hourly_forecasts()?)
    }

    /// Hourly chance of precipitation from `start` through `end` inclusive.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_precipitation_probabilities(
        &self,
        latitude: &str,
        longitude: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PrecipitationProbability>, RepositoryError> {
        let coordinates = Coordinates::parse(latitude, longitude)?;
        check_range(start, end)?;

        let response = self.source.hourly_forecast(coordinates, start, end).await?;
        Ok(response.to_precipitation_probabilities()?)
    }

    /// Observe the saved location list. `callback` gets the current list
    /// immediately and a fresh list after every save or delete.
    pub fn observe_saved_locations<F>(&self, callback: F) -> Result<Subscription, RepositoryError>
    where
        F: Fn(Vec<SavedLocation>) + Send + Sync + 'static,
    {
        let subscription = self
            .store
            .observe_all(Box::new(move |records| callback(to_saved_locations(records))))?;
        Ok(subscription)
    }

    pub fn saved_locations(&self) -> Result<Vec<SavedLocation>, RepositoryError> {
        Ok(to_saved_locations(&self.store.list()?))
    }

    pub fn is_location_saved(&self, name_of_location: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .store
            .list()?
            .iter()
            .any(|r| r.name_of_location == name_of_location))
    }

    /// Save a location. Saving the same coordinates again replaces the earlier record.
    #[instrument(skip(self), level = "info")]
    pub fn save_weather_location(
        &self,
        name_of_location: &str,
        latitude: &str,
        longitude: &str,
    ) -> Result<SavedWeatherLocation, RepositoryError> {
        let coordinates = Coordinates::parse(latitude, longitude)?;

        let record = SavedWeatherLocation {
            id: location_id(coordinates),
            name_of_location: name_of_location.trim().to_string(),
            latitude: latitude.trim().to_string(),
            longitude: longitude.trim().to_string(),
        };
        self.store.insert_or_replace(record.clone())?;

        tracing::info!("Saved location {}", record.name_of_location);
        Ok(record)
    }

    #[instrument(skip(self), level = "info")]
    pub fn delete_weather_location(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> Result<(), RepositoryError> {
        let coordinates = Coordinates::parse(latitude, longitude)?;
        self.store.delete(&location_id(coordinates))?;
        Ok(())
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), RepositoryError> {
    if start > end {
        return Err(RepositoryError::InvalidDateRange { start, end });
    }
    Ok(())
}
