//! Open-Meteo response payloads and their mapping into domain values.
//!
//! Coordinates and the current temperature are kept as the text the service
//! sent. Open-Meteo encodes them as JSON numbers but strings are accepted too.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

use crate::classifier::classify;
use crate::error::{MappingError, UnknownWeatherCode};
use crate::types::{CurrentWeatherDetails, HourlyForecast, PrecipitationProbability};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Response of `/forecast?current_weather=true`. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeatherResponse {
    pub current_weather: CurrentWeather,
    #[serde(deserialize_with = "string_or_number")]
    pub latitude: String,
    #[serde(deserialize_with = "string_or_number")]
    pub longitude: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeather {
    #[serde(deserialize_with = "string_or_number")]
    pub temperature: String,
    /// 1 during daylight, 0 at night
    pub is_day: u8,
    #[serde(rename = "weathercode")]
    pub weather_code: i32,
}

impl CurrentWeatherResponse {
    /// Build display-ready details for this payload under the given place name.
    pub fn to_current_weather_details(
        &self,
        name_of_location: &str,
    ) -> Result<CurrentWeatherDetails, UnknownWeatherCode> {
        let is_day = self.current_weather.is_day == 1;
        let classification = classify(self.current_weather.weather_code, is_day)?;

        Ok(CurrentWeatherDetails {
            temperature: self.current_weather.temperature.clone(),
            name_of_location: name_of_location.to_string(),
            weather_condition: classification.description.to_string(),
            is_day,
            icon: classification.icon,
            image: classification.image,
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
        })
    }
}

/// Response of `/forecast?hourly=...`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HourlyForecastResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub latitude: String,
    #[serde(deserialize_with = "string_or_number")]
    pub longitude: String,
    pub hourly: HourlySeries,
}

/// Parallel arrays indexed by `time`. Individual values may be null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default, rename = "weathercode")]
    pub weather_code: Vec<Option<i32>>,
    #[serde(default)]
    pub is_day: Vec<Option<u8>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<u8>>,
}

impl HourlySeries {
    fn check_len(&self, field: &'static str, actual: usize) -> Result<(), MappingError> {
        if actual != self.time.len() {
            return Err(MappingError::MismatchedSeries {
                field,
                expected: self.time.len(),
                actual,
            });
        }
        Ok(())
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, MappingError> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| MappingError::InvalidTimestamp(value.to_string()))
}

impl HourlyForecastResponse {
    /// Hourly temperatures with icons. Hours missing a temperature or code are skipped.
    pub fn to_hourly_forecasts(&self) -> Result<Vec<HourlyForecast>, MappingError> {
        let series = &self.hourly;
        series.check_len("temperature_2m", series.temperature_2m.len())?;
        series.check_len("weathercode", series.weather_code.len())?;
        series.check_len("is_day", series.is_day.len())?;

        let mut forecasts = Vec::with_capacity(series.time.len());
        for (idx, time) in series.time.iter().enumerate() {
            let date_time = parse_timestamp(time)?;
            let (Some(temperature), Some(code), Some(is_day)) = (
                series.temperature_2m[idx],
                series.weather_code[idx],
                series.is_day[idx],
            ) else {
                tracing::debug!("Skipping incomplete hourly entry at {}", time);
                continue;
            };

            forecasts.push(HourlyForecast::new(date_time, temperature, code, is_day == 1)?);
        }

        Ok(forecasts)
    }

    /// Chance of precipitation per hour. Hours without a value are skipped.
    pub fn to_precipitation_probabilities(
        &self,
    ) -> Result<Vec<PrecipitationProbability>, MappingError> {
        let series = &self.hourly;
        series.check_len(
            "precipitation_probability",
            series.precipitation_probability.len(),
        )?;

        series
            .time
            .iter()
            .zip(&series.precipitation_probability)
            .filter_map(|(time, probability)| probability.map(|p| (time, p)))
            .map(|(time, probability)| -> Result<_, MappingError> {
                Ok(PrecipitationProbability {
                    latitude: self.latitude.clone(),
                    longitude: self.longitude.clone(),
                    date_time: parse_timestamp(time)?,
                    probability_percentage: probability.min(100),
                })
            })
            .collect()
    }
}
