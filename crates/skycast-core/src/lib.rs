pub mod app;
pub mod config;
pub mod error;
pub mod ui_state;

pub use app::App;
pub use config::{
    Config, LoggingConfig, StorageConfig, TemperatureUnit, ValidationResult, WeatherConfig,
};
pub use error::{
    AppError, ConfigError, DatabaseError, NetworkError, ReqwestErrorExt, RusqliteErrorExt,
};
pub use ui_state::UiState;

use anyhow::Result;

/// Initialize logging with the default `info` level.
pub fn init() -> Result<()> {
    init_with_level("info")
}

/// Initialize logging. `RUST_LOG` takes precedence over `default_level`.
pub fn init_with_level(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("SkyCast core initialized");
    Ok(())
}
