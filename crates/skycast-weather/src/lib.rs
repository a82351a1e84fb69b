//! Weather data for SkyCast
//!
//! Classifies WMO weather codes for display, maps Open-Meteo payloads into
//! domain values and resolves human-readable place names for coordinates.

pub mod classifier;
pub mod client;
pub mod error;
pub mod geocode;
pub mod response;
pub mod retry;
pub mod source;
pub mod types;

pub use classifier::{classify, describe, WeatherCategory, WeatherClassification, WeatherIcon, WeatherImage};
pub use client::OpenMeteoClient;
pub use error::{CoordinateError, MappingError, UnknownWeatherCode, WeatherError};
pub use geocode::{LocationNameResolver, NominatimGeocoder};
pub use response::{CurrentWeatherResponse, HourlyForecastResponse};
pub use retry::RetryConfig;
pub use source::WeatherSource;
pub use types::*;
