use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::WeatherError;
use crate::response::{CurrentWeatherResponse, HourlyForecastResponse};
use crate::types::Coordinates;

/// Remote provider of raw weather payloads.
///
/// Implementations return the service's payload untouched; mapping into
/// domain values happens in the caller.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_weather(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentWeatherResponse, WeatherError>;

    /// Hourly series covering `start` through `end`, both inclusive.
    async fn hourly_forecast(
        &self,
        coordinates: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HourlyForecastResponse, WeatherError>;
}
