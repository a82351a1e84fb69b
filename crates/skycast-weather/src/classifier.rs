//! WMO weather code classification.
//!
//! A code plus a day/night flag resolves to the exact description for that
//! code and to icon and image identifiers chosen by the code's category.
//! See: https://open-meteo.com/en/docs#weathervariables
//!
//! Unknown codes are an error, never a default.

use serde::{Serialize, Serializer};

use crate::error::UnknownWeatherCode;

/// Exact-code descriptions, sorted by code for binary search.
const WEATHER_CODE_DESCRIPTIONS: [(i32, &str); 28] = [
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Fog"),
    (48, "Depositing rime fog"),
    (51, "Drizzle"),
    (53, "Drizzle"),
    (55, "Drizzle"),
    (56, "Freezing drizzle"),
    (57, "Freezing drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Slight snow fall"),
    (73, "Moderate snow fall"),
    (75, "Heavy snow fall"),
    (77, "Snow grains"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Slight snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorms"),
    (96, "Thunderstorms with slight hail"),
    (99, "Thunderstorms with heavy hail"),
];

/// Every weather code the classifier understands, in ascending order.
pub fn known_codes() -> impl Iterator<Item = i32> {
    WEATHER_CODE_DESCRIPTIONS.iter().map(|(code, _)| *code)
}

/// Description for an exact weather code.
pub fn describe(code: i32) -> Result<&'static str, UnknownWeatherCode> {
    WEATHER_CODE_DESCRIPTIONS
        .binary_search_by_key(&code, |(c, _)| *c)
        .map(|idx| WEATHER_CODE_DESCRIPTIONS[idx].1)
        .map_err(|_| UnknownWeatherCode(code))
}

/// Presentation bucket for a weather code. Drives icon and image selection only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCategory {
    Clear,
    Cloudy,
    Rainy,
    Thunderstorm,
    Snow,
    Fog,
}

impl WeatherCategory {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Clear),
            1 | 2 | 3 => Some(Self::Cloudy),
            // drizzle, freezing drizzle and rain showers
            51 | 53 | 55 | 56 | 57 | 80 | 81 | 82 => Some(Self::Rainy),
            // rain, freezing rain and thunderstorms with or without hail
            61 | 63 | 65 | 66 | 67 | 95 | 96 | 99 => Some(Self::Thunderstorm),
            71 | 73 | 75 | 77 | 85 | 86 => Some(Self::Snow),
            45 | 48 => Some(Self::Fog),
            _ => None,
        }
    }

    pub fn icon(self, is_day: bool) -> WeatherIcon {
        match (self, is_day) {
            (Self::Clear, true) => WeatherIcon::DayClear,
            (Self::Clear, false) => WeatherIcon::NightClear,
            (Self::Cloudy, true) => WeatherIcon::DayFewClouds,
            (Self::Cloudy, false) => WeatherIcon::NightFewClouds,
            (Self::Rainy, true) => WeatherIcon::DayRain,
            (Self::Rainy, false) => WeatherIcon::NightRain,
            (Self::Thunderstorm, true) => WeatherIcon::DayThunderstorms,
            (Self::Thunderstorm, false) => WeatherIcon::NightThunderstorms,
            (Self::Snow, true) => WeatherIcon::DaySnow,
            (Self::Snow, false) => WeatherIcon::NightSnow,
            (Self::Fog, _) => WeatherIcon::Mist,
        }
    }

    /// Background image. There is no thunderstorm artwork, so those codes share the rain image.
    pub fn image(self, is_day: bool) -> WeatherImage {
        match (self, is_day) {
            (Self::Clear, true) => WeatherImage::DayClear,
            (Self::Clear, false) => WeatherImage::NightClear,
            (Self::Cloudy, true) => WeatherImage::DayCloudy,
            (Self::Cloudy, false) => WeatherImage::NightCloudy,
            (Self::Rainy | Self::Thunderstorm, true) => WeatherImage::DayRain,
            (Self::Rainy | Self::Thunderstorm, false) => WeatherImage::NightRain,
            (Self::Snow, true) => WeatherImage::DaySnow,
            (Self::Snow, false) => WeatherImage::NightSnow,
            (Self::Fog, true) => WeatherImage::DayFog,
            (Self::Fog, false) => WeatherImage::NightFog,
        }
    }
}

/// Small condition icon shown next to temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    DayClear,
    NightClear,
    DayFewClouds,
    NightFewClouds,
    DayRain,
    NightRain,
    DayThunderstorms,
    NightThunderstorms,
    DaySnow,
    NightSnow,
    Mist,
}

impl WeatherIcon {
    /// Stable asset handle for UI layers.
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::DayClear => "ic_day_clear",
            Self::NightClear => "ic_night_clear",
            Self::DayFewClouds => "ic_day_few_clouds",
            Self::NightFewClouds => "ic_night_few_clouds",
            Self::DayRain => "ic_day_rain",
            Self::NightRain => "ic_night_rain",
            Self::DayThunderstorms => "ic_day_thunderstorms",
            Self::NightThunderstorms => "ic_night_thunderstorms",
            Self::DaySnow => "ic_day_snow",
            Self::NightSnow => "ic_night_snow",
            Self::Mist => "ic_mist",
        }
    }
}

impl Serialize for WeatherIcon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.resource_name())
    }
}

/// Full-width background image for the detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherImage {
    DayClear,
    NightClear,
    DayCloudy,
    NightCloudy,
    DayRain,
    NightRain,
    DaySnow,
    NightSnow,
    DayFog,
    NightFog,
}

impl WeatherImage {
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::DayClear => "img_day_clear",
            Self::NightClear => "img_night_clear",
            Self::DayCloudy => "img_day_cloudy",
            Self::NightCloudy => "img_night_cloudy",
            Self::DayRain => "img_day_rain",
            Self::NightRain => "img_night_rain",
            Self::DaySnow => "img_day_snow",
            Self::NightSnow => "img_night_snow",
            Self::DayFog => "img_day_fog",
            Self::NightFog => "img_night_fog",
        }
    }
}

impl Serialize for WeatherImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.resource_name())
    }
}

/// Everything the UI needs to present one weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherClassification {
    pub description: &'static str,
    pub icon: WeatherIcon,
    pub image: WeatherImage,
}

/// Classify a weather code for day or night display.
pub fn classify(code: i32, is_day: bool) -> Result<WeatherClassification, UnknownWeatherCode> {
    let description = describe(code)?;
    let category = WeatherCategory::from_code(code).ok_or(UnknownWeatherCode(code))?;

    Ok(WeatherClassification {
        description,
        icon: category.icon(is_day),
        image: category.image(is_day),
    })
}
