//! Integration tests for WeatherRepository against mocked Open-Meteo and Nominatim endpoints.

use std::sync::Arc;

use chrono::NaiveDate;
use skycast_core::WeatherConfig;
use skycast_services::{RepositoryError, SqliteLocationStore, WeatherRepository};
use skycast_weather::{NominatimGeocoder, OpenMeteoClient, WeatherIcon, WeatherImage};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repository_for(server: &MockServer) -> WeatherRepository {
    let config = WeatherConfig {
        base_url: server.uri(),
        geocoding_url: server.uri(),
        max_retries: 0,
        ..WeatherConfig::default()
    };

    WeatherRepository::new(
        Arc::new(OpenMeteoClient::new(&config).unwrap()),
        Arc::new(NominatimGeocoder::new(&config).unwrap()),
        Arc::new(SqliteLocationStore::in_memory().unwrap()),
    )
}

async fn mount_current(server: &MockServer, code: i32, is_day: u8) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("current_weather", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 40.71,
            "longitude": -74.01,
            "current_weather": {"temperature": 12.5, "is_day": is_day, "weathercode": code}
        })))
        .mount(server)
        .await;
}

async fn mount_reverse(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": {"city": "New York", "state": "New York"}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_current_weather_day() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, 61, 1).await;
    mount_reverse(&mock_server).await;

    let details = repository_for(&mock_server)
        .fetch_weather_for_location("40.7128", "-74.0060")
        .await
        .unwrap();

    assert_eq!(details.weather_condition, "Slight rain");
    assert_eq!(details.icon, WeatherIcon::DayThunderstorms);
    assert_eq!(details.image, WeatherImage::DayRain);
    assert!(details.is_day);
    assert_eq!(details.temperature, "12.5");
    assert_eq!(details.name_of_location, "New York, New York");
}

#[tokio::test]
async fn test_fetch_current_weather_night() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, 61, 0).await;
    mount_reverse(&mock_server).await;

    let details = repository_for(&mock_server)
        .fetch_weather_for_location("40.7128", "-74.0060")
        .await
        .unwrap();

    assert_eq!(details.icon, WeatherIcon::NightThunderstorms);
    assert_eq!(details.image, WeatherImage::NightRain);
    assert!(!details.is_day);
}

#[tokio::test]
async fn test_geocoder_failure_uses_coordinates() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, 0, 1).await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let details = repository_for(&mock_server)
        .fetch_weather_for_location("40.7128", "-74.0060")
        .await
        .unwrap();

    assert_eq!(details.name_of_location, "40.7128, -74.006");
    assert_eq!(details.weather_condition, "Clear sky");
    assert_eq!(details.icon, WeatherIcon::DayClear);
}

#[tokio::test]
async fn test_server_error_is_remote_fetch_error() {
    let mock_server = MockServer::start().await;
    mount_reverse(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let result = repository_for(&mock_server)
        .fetch_weather_for_location("40.7128", "-74.0060")
        .await;

    assert!(matches!(result, Err(RepositoryError::RemoteFetch(_))));
}

#[tokio::test]
async fn test_hourly_forecast_for_today() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("start_date", "2024-03-10"))
        .and(query_param("end_date", "2024-03-10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 40.71,
            "longitude": -74.01,
            "hourly": {
                "time": ["2024-03-10T00:00", "2024-03-10T13:00"],
                "temperature_2m": [3.4, 9.6],
                "weathercode": [0, 3],
                "is_day": [0, 1],
                "precipitation_probability": [0, 35]
            }
        })))
        .mount(&mock_server)
        .await;

    let repo = repository_for(&mock_server);
    let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

    let hourly = repo
        .fetch_hourly_forecasts("40.7128", "-74.0060", day, day)
        .await
        .unwrap();
    assert_eq!(hourly.len(), 2);
    assert_eq!((hourly[0].hour, hourly[0].is_am), (12, true));
    assert_eq!(hourly[0].weather_icon, WeatherIcon::NightClear);
    assert_eq!(hourly[1].temperature_string, "10°");
    assert_eq!(hourly[1].weather_icon, WeatherIcon::DayFewClouds);

    let rain = repo
        .fetch_precipitation_probabilities("40.7128", "-74.0060", day, day)
        .await
        .unwrap();
    assert_eq!(rain[1].probability_percentage, 35);
}

#[tokio::test]
async fn test_saved_name_wins_over_geocoder() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, 2, 1).await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": {"city": "Somewhere Else"}
        })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let repo = repository_for(&mock_server);
    repo.save_weather_location("Office", "40.7128", "-74.0060")
        .unwrap();

    let details = repo
        .fetch_weather_for_location("40.7128", "-74.0060")
        .await
        .unwrap();

    assert_eq!(details.name_of_location, "Office");
    assert_eq!(details.weather_condition, "Partly cloudy");
}
