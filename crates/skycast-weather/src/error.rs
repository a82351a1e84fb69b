//! Weather-specific error types.

use skycast_core::NetworkError;
use thiserror::Error;

/// A weather code outside the known WMO table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unknown weather code: {0}")]
pub struct UnknownWeatherCode(pub i32);

/// Failures turning a well-formed payload into domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error(transparent)]
    UnknownWeatherCode(#[from] UnknownWeatherCode),

    #[error("Hourly series '{field}' has {actual} entries, expected {expected}")]
    MismatchedSeries {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("{field} is not a number: '{value}'")]
    Unparsable { field: &'static str, value: String },

    #[error("{field} {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl WeatherError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(e) => e.user_message().to_string(),
            Self::BadRequest(_) => "The weather service rejected the request.".to_string(),
            Self::RateLimited(secs) => {
                format!("Too many requests. Please wait {} seconds.", secs)
            }
            Self::Api { status, .. } if *status >= 500 => {
                "The weather service is unavailable. Please try again later.".to_string()
            }
            Self::Api { .. } => "Weather request failed. Please try again.".to_string(),
            Self::InvalidResponse(_) => "Received unreadable weather data.".to_string(),
            Self::Client(_) => "Weather client could not be created.".to_string(),
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_) => true,
            Self::Network(e) => e.is_transient(),
            Self::Api { status, .. } => *status >= 500 || *status == 408,
            _ => false,
        }
    }
}
