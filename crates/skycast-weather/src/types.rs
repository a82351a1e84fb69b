use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::classifier::{classify, WeatherIcon, WeatherImage};
use crate::error::{CoordinateError, UnknownWeatherCode};

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::OutOfRange {
                field: "latitude",
                value: latitude,
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::OutOfRange {
                field: "longitude",
                value: longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse user or storage supplied coordinate strings.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, CoordinateError> {
        let lat = parse_degrees("latitude", latitude)?;
        let lon = parse_degrees("longitude", longitude)?;
        Self::new(lat, lon)
    }
}

fn parse_degrees(field: &'static str, value: &str) -> Result<f64, CoordinateError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| CoordinateError::Unparsable {
            field,
            value: value.to_string(),
        })
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Current conditions at a named location, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeatherDetails {
    pub temperature: String,
    pub name_of_location: String,
    pub weather_condition: String,
    pub is_day: bool,
    pub icon: WeatherIcon,
    pub image: WeatherImage,
    pub latitude: String,
    pub longitude: String,
}

/// A forecasted temperature for one hour, on a 12-hour clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    pub date_time: NaiveDateTime,
    /// 1 through 12
    pub hour: u8,
    pub is_am: bool,
    pub weather_icon: WeatherIcon,
    pub temperature_string: String,
}

impl HourlyForecast {
    pub fn new(
        date_time: NaiveDateTime,
        temperature: f64,
        weather_code: i32,
        is_day: bool,
    ) -> Result<Self, UnknownWeatherCode> {
        let classification = classify(weather_code, is_day)?;
        let (is_pm, hour) = date_time.hour12();

        Ok(Self {
            date_time,
            hour: hour as u8,
            is_am: !is_pm,
            weather_icon: classification.icon,
            temperature_string: format!("{}°", temperature.round() as i64),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrecipitationProbability {
    pub latitude: String,
    pub longitude: String,
    pub date_time: NaiveDateTime,
    pub probability_percentage: u8,
}

/// A location the user chose to keep, as shown in the saved list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedLocation {
    pub name_of_location: String,
    pub coordinates: Coordinates,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_coordinates() {
        let c = Coordinates::parse("40.7128", " -74.0060 ").unwrap();
        assert_eq!(c.latitude, 40.7128);
        assert_eq!(c.longitude, -74.006);
        assert_eq!(c.to_string(), "40.7128, -74.006");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Coordinates::parse("north", "0").unwrap_err();
        assert!(matches!(err, CoordinateError::Unparsable { field: "latitude", .. }));
    }

    #[test]
    fn test_out_of_range() {
        assert!(Coordinates::new(90.5, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.1).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_hourly_forecast_twelve_hour_clock() {
        let midnight = HourlyForecast::new(at(0, 0), 3.4, 0, false).unwrap();
        assert_eq!((midnight.hour, midnight.is_am), (12, true));

        let noon = HourlyForecast::new(at(12, 0), 3.4, 0, true).unwrap();
        assert_eq!((noon.hour, noon.is_am), (12, false));

        let evening = HourlyForecast::new(at(19, 0), 3.4, 0, false).unwrap();
        assert_eq!((evening.hour, evening.is_am), (7, false));
    }

    #[test]
    fn test_hourly_forecast_rounds_temperature() {
        let f = HourlyForecast::new(at(9, 0), -0.6, 61, true).unwrap();
        assert_eq!(f.temperature_string, "-1°");
        assert_eq!(f.weather_icon, WeatherIcon::DayThunderstorms);
    }

    #[test]
    fn test_hourly_forecast_unknown_code() {
        assert_eq!(
            HourlyForecast::new(at(9, 0), 10.0, 42, true),
            Err(UnknownWeatherCode(42))
        );
    }
}
