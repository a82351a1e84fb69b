//! Centralized application services.
//!
//! `AppServices` owns the tokio runtime and the shared `WeatherRepository`,
//! hands out detail models bound to both, and coordinates shutdown through a
//! root `CancellationToken` whose children scope each model's requests.

use std::sync::Arc;

use skycast_core::Config;
use skycast_services::{SqliteLocationStore, StoreError, WeatherRepository};
use skycast_weather::{NominatimGeocoder, OpenMeteoClient, WeatherError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::models::weather_detail_model::WeatherDetailModel;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("Failed to create weather client: {0}")]
    Weather(#[from] WeatherError),

    #[error("Failed to open saved locations: {0}")]
    Storage(#[from] StoreError),
}

pub struct AppServices {
    /// Tokio runtime for async operations
    runtime: tokio::runtime::Runtime,

    repository: Arc<WeatherRepository>,

    /// Parent of every model's cancellation token
    shutdown: CancellationToken,
}

impl AppServices {
    /// Build the runtime, HTTP clients and saved location store from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ServicesError> {
        let runtime = Self::build_runtime()?;

        let source = OpenMeteoClient::new(&config.weather)?;
        let names = NominatimGeocoder::new(&config.weather)?;
        let store = SqliteLocationStore::open(config.database_path())?;

        let repository = WeatherRepository::new(Arc::new(source), Arc::new(names), Arc::new(store));

        tracing::info!("AppServices initialized");
        Ok(Self::with_repository(runtime, Arc::new(repository)))
    }

    /// Wrap an existing runtime and repository.
    pub fn with_repository(
        runtime: tokio::runtime::Runtime,
        repository: Arc<WeatherRepository>,
    ) -> Self {
        Self {
            runtime,
            repository,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn build_runtime() -> Result<tokio::runtime::Runtime, ServicesError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("skycast-tokio")
            .build()?;
        Ok(runtime)
    }

    /// Get the tokio runtime handle.
    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn repository(&self) -> Arc<WeatherRepository> {
        Arc::clone(&self.repository)
    }

    /// A detail model for one location. Its first fetch starts immediately.
    pub fn detail_model(
        &self,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        was_location_previously_saved: bool,
    ) -> WeatherDetailModel {
        WeatherDetailModel::new(
            latitude,
            longitude,
            was_location_previously_saved,
            self.repository(),
            self.runtime(),
            self.shutdown.child_token(),
        )
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Cancel every outstanding request. Models created afterwards start cancelled.
    pub fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");
        self.shutdown.cancel();
    }
}
