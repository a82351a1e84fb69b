//! Open-Meteo forecast API client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use skycast_core::{ReqwestErrorExt, TemperatureUnit, WeatherConfig};
use tracing::instrument;

use crate::error::WeatherError;
use crate::response::{CurrentWeatherResponse, HourlyForecastResponse};
use crate::retry::{with_retry, RetryConfig};
use crate::source::WeatherSource;
use crate::types::Coordinates;

const USER_AGENT: &str = concat!("SkyCast/", env!("CARGO_PKG_VERSION"));
const HOURLY_VARIABLES: &str = "temperature_2m,weathercode,is_day,precipitation_probability";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Error body Open-Meteo sends with 400 responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: Option<String>,
}

pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
    temperature_unit: TemperatureUnit,
    retry: RetryConfig,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature_unit: config.temperature_unit,
            retry: RetryConfig {
                max_retries: config.max_retries,
                ..RetryConfig::default()
            },
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn base_query(&self, coordinates: Coordinates) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
        ];
        if let Some(unit) = self.temperature_unit.query_value() {
            query.push(("temperature_unit", unit.to_string()));
        }
        query
    }

    async fn get_forecast<T: serde::de::DeserializeOwned>(
        &self,
        query: &[(&'static str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        let url = &url;

        with_retry(&self.retry, || async move {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| WeatherError::Network(e.into_network_error()))?;

            Self::handle_response(response).await
        })
        .await
    }

    /// Map HTTP status codes to weather errors and decode successful bodies.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| WeatherError::InvalidResponse(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 400 {
            let text = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|body| body.reason)
                .unwrap_or(text);
            Err(WeatherError::BadRequest(reason))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            Err(WeatherError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(WeatherError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    #[instrument(skip(self), level = "info")]
    async fn current_weather(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentWeatherResponse, WeatherError> {
        let mut query = self.base_query(coordinates);
        query.push(("current_weather", "true".to_string()));

        self.get_forecast(&query).await
    }

    #[instrument(skip(self), level = "info")]
    async fn hourly_forecast(
        &self,
        coordinates: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HourlyForecastResponse, WeatherError> {
        let mut query = self.base_query(coordinates);
        query.extend([
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
            ("timezone", "auto".to_string()),
        ]);

        self.get_forecast(&query).await
    }
}
