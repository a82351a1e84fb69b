//! State holder behind the weather detail screen.
//!
//! Requests run on the shared runtime and report back over an mpsc channel.
//! The owner drains that channel with `poll_channel` (or blocks briefly with
//! `wait_for_update`) and observes the results through `watch` receivers.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use skycast_core::UiState;
use skycast_services::{Subscription, WeatherRepository};
use skycast_weather::{CurrentWeatherDetails, SavedLocation};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::services::weather_service::{request_fetch, request_remove, request_save};
use crate::services::WeatherServiceMessage;

pub struct WeatherDetailModel {
    latitude: String,
    longitude: String,
    repository: Arc<WeatherRepository>,
    runtime: Handle,
    cancel: CancellationToken,

    tx: Sender<WeatherServiceMessage>,
    rx: Receiver<WeatherServiceMessage>,
    subscription: Option<Subscription>,

    ui_state: watch::Sender<UiState>,
    weather_details: watch::Sender<Option<CurrentWeatherDetails>>,
    is_saved_location: watch::Sender<bool>,

    saved_locations: Vec<SavedLocation>,
    error_message: Option<String>,
}

impl WeatherDetailModel {
    /// Create the model and start the first fetch.
    ///
    /// `was_location_previously_saved` is reported by `is_saved_location`
    /// until details have loaded. Requests stop when `cancel` is cancelled
    /// or the model is dropped.
    pub fn new(
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        was_location_previously_saved: bool,
        repository: Arc<WeatherRepository>,
        runtime: Handle,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let (ui_state, _) = watch::channel(UiState::Idle);
        let (weather_details, _) = watch::channel(None);
        let (is_saved_location, _) = watch::channel(was_location_previously_saved);

        let observer_tx = Mutex::new(tx.clone());
        let subscription = match repository.observe_saved_locations(move |locations| {
            let _ = observer_tx
                .lock()
                .send(WeatherServiceMessage::SavedLocationsChanged(locations));
        }) {
            Ok(sub) => Some(sub),
            Err(e) => {
                tracing::warn!("Could not observe saved locations: {}", e);
                None
            }
        };

        let mut model = Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            repository,
            runtime,
            cancel,
            tx,
            rx,
            subscription,
            ui_state,
            weather_details,
            is_saved_location,
            saved_locations: Vec::new(),
            error_message: None,
        };
        model.refresh();
        model
    }

    pub fn latitude(&self) -> &str {
        &self.latitude
    }

    pub fn longitude(&self) -> &str {
        &self.longitude
    }

    pub fn ui_state(&self) -> watch::Receiver<UiState> {
        self.ui_state.subscribe()
    }

    pub fn weather_details(&self) -> watch::Receiver<Option<CurrentWeatherDetails>> {
        self.weather_details.subscribe()
    }

    pub fn is_saved_location(&self) -> watch::Receiver<bool> {
        self.is_saved_location.subscribe()
    }

    pub fn current_ui_state(&self) -> UiState {
        *self.ui_state.borrow()
    }

    /// User-facing text for the last failed request, cleared by the next request.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Fetch current weather again. Ignored while a request is in flight.
    pub fn refresh(&mut self) {
        if self.current_ui_state().is_loading() {
            tracing::debug!("Refresh ignored, a request is already in flight");
            return;
        }

        self.start_request();
        request_fetch(
            &self.tx,
            &self.runtime,
            Arc::clone(&self.repository),
            self.cancel.clone(),
            self.latitude.clone(),
            self.longitude.clone(),
        );
    }

    /// Save the displayed location. Does nothing until details have loaded.
    pub fn add_location_to_saved_locations(&mut self) {
        let name = match self.weather_details.borrow().as_ref() {
            Some(details) => details.name_of_location.clone(),
            None => return,
        };

        self.start_request();
        request_save(
            &self.tx,
            &self.runtime,
            Arc::clone(&self.repository),
            self.cancel.clone(),
            name,
            self.latitude.clone(),
            self.longitude.clone(),
        );
    }

    pub fn remove_location_from_saved_locations(&mut self) {
        self.start_request();
        request_remove(
            &self.tx,
            &self.runtime,
            Arc::clone(&self.repository),
            self.cancel.clone(),
            self.latitude.clone(),
            self.longitude.clone(),
        );
    }

    /// Apply every pending message. Returns `true` if anything was applied.
    pub fn poll_channel(&mut self) -> bool {
        let mut applied = false;
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
            applied = true;
        }
        applied
    }

    /// Block up to `timeout` for the next message, then apply it and anything else pending.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => {
                self.apply(msg);
                self.poll_channel();
                true
            }
            Err(_) => false,
        }
    }

    fn start_request(&mut self) {
        self.error_message = None;
        let next = self.current_ui_state().on_request_started();
        self.set_ui_state(next);
    }

    fn apply(&mut self, msg: WeatherServiceMessage) {
        match msg {
            WeatherServiceMessage::FetchDone(Ok(details)) => {
                tracing::info!("Weather loaded for {}", details.name_of_location);
                self.weather_details.send_replace(Some(details));
                self.update_is_saved_location();
                self.finish(None);
            }
            WeatherServiceMessage::FetchDone(Err(e)) => {
                tracing::warn!("Weather fetch failed: {}", e);
                self.finish(Some(e.user_message()));
            }
            WeatherServiceMessage::SaveDone(result) => {
                self.finish(result.err().map(|e| {
                    tracing::warn!("Saving location failed: {}", e);
                    e.user_message()
                }));
            }
            WeatherServiceMessage::RemoveDone(result) => {
                self.finish(result.err().map(|e| {
                    tracing::warn!("Removing location failed: {}", e);
                    e.user_message()
                }));
            }
            WeatherServiceMessage::SavedLocationsChanged(locations) => {
                self.saved_locations = locations;
                self.update_is_saved_location();
            }
        }
    }

    fn finish(&mut self, error: Option<String>) {
        let state = self.current_ui_state();
        if !state.is_loading() {
            tracing::debug!("Ignoring completion that arrived in {}", state);
            return;
        }

        let next = match error {
            None => state.on_success(),
            Some(message) => {
                self.error_message = Some(message);
                state.on_failure()
            }
        };
        self.set_ui_state(next);
    }

    /// A location counts as saved when a saved entry has the displayed name.
    /// Before details load there is nothing to compare, so the initial value stands.
    fn update_is_saved_location(&mut self) {
        let saved = match self.weather_details.borrow().as_ref() {
            Some(details) => self
                .saved_locations
                .iter()
                .any(|l| l.name_of_location == details.name_of_location),
            None => return,
        };

        self.is_saved_location.send_if_modified(|current| {
            let changed = *current != saved;
            *current = saved;
            changed
        });
    }

    fn set_ui_state(&self, next: UiState) {
        self.ui_state.send_if_modified(|current| {
            let changed = *current != next;
            *current = next;
            changed
        });
    }
}

impl Drop for WeatherDetailModel {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(sub) = self.subscription.take() {
            sub.cancel();
        }
        tracing::debug!(
            "Weather detail model for {}, {} dropped",
            self.latitude,
            self.longitude
        );
    }
}
