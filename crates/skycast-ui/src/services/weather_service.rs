//! Weather backend: async fetch/save/remove for the detail model.
//! All repository work runs off the caller's thread; results sent via mpsc.
//!
//! Every request races the model's `CancellationToken`. A cancelled request
//! sends nothing; a write that already reached the store is not rolled back.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use skycast_services::{RepositoryError, SavedWeatherLocation, WeatherRepository};
use skycast_weather::{CurrentWeatherDetails, SavedLocation};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Messages sent from async operations back to the model
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of fetching current weather
    FetchDone(Result<CurrentWeatherDetails, RepositoryError>),
    /// Result of saving the location
    SaveDone(Result<SavedWeatherLocation, RepositoryError>),
    /// Result of removing the location
    RemoveDone(Result<(), RepositoryError>),
    /// The saved location list changed
    SavedLocationsChanged(Vec<SavedLocation>),
}

/// Request current weather for a coordinate pair.
/// Sends `FetchDone` on the channel when complete.
pub fn request_fetch(
    tx: &Sender<WeatherServiceMessage>,
    runtime: &Handle,
    repository: Arc<WeatherRepository>,
    cancel: CancellationToken,
    latitude: String,
    longitude: String,
) {
    let tx = tx.clone();

    runtime.spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Weather fetch for {}, {} cancelled", latitude, longitude);
            }
            result = repository.fetch_weather_for_location(&latitude, &longitude) => {
                let _ = tx.send(WeatherServiceMessage::FetchDone(result));
            }
        }
    });
}

/// Request to save a location.
/// Sends `SaveDone` on the channel when complete.
pub fn request_save(
    tx: &Sender<WeatherServiceMessage>,
    runtime: &Handle,
    repository: Arc<WeatherRepository>,
    cancel: CancellationToken,
    name_of_location: String,
    latitude: String,
    longitude: String,
) {
    let tx = tx.clone();

    runtime.spawn_blocking(move || {
        if cancel.is_cancelled() {
            return;
        }
        let result = repository.save_weather_location(&name_of_location, &latitude, &longitude);
        if cancel.is_cancelled() {
            tracing::debug!("Save of {} finished after cancellation", name_of_location);
            return;
        }
        let _ = tx.send(WeatherServiceMessage::SaveDone(result));
    });
}

/// Request to remove a saved location.
/// Sends `RemoveDone` on the channel when complete.
pub fn request_remove(
    tx: &Sender<WeatherServiceMessage>,
    runtime: &Handle,
    repository: Arc<WeatherRepository>,
    cancel: CancellationToken,
    latitude: String,
    longitude: String,
) {
    let tx = tx.clone();

    runtime.spawn_blocking(move || {
        if cancel.is_cancelled() {
            return;
        }
        let result = repository.delete_weather_location(&latitude, &longitude);
        if cancel.is_cancelled() {
            return;
        }
        let _ = tx.send(WeatherServiceMessage::RemoveDone(result));
    });
}
