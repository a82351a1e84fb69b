use anyhow::Result;
use std::sync::Arc;

use crate::{AppError, Config, ValidationResult};

/// Application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
    validation: ValidationResult,
}

impl App {
    /// Create an application from the user's config file
    pub fn new() -> Result<Self> {
        let (config, validation) = Config::load_validated()?;
        Ok(Self {
            config: Arc::new(config),
            validation,
        })
    }

    /// Create an application from an already loaded config
    pub fn with_config(config: Config) -> Result<Self> {
        let (config, validation) = config.into_validated()?;
        Ok(Self {
            config: Arc::new(config),
            validation,
        })
    }

    /// Prepare directories needed at runtime
    pub fn initialize(&self) -> Result<(), AppError> {
        tracing::info!(
            "Initializing SkyCast with config dir {}",
            self.config.config_dir.display()
        );

        if let Some(parent) = self.config.database_path().parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!("Application initialized successfully");
        Ok(())
    }

    pub fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the config for services
    pub fn shared_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Warnings produced while validating the config
    pub fn warnings(&self) -> &[crate::config::ConfigValidationError] {
        &self.validation.warnings
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_with_config_rejects_invalid() {
        let mut config = Config::default();
        config.weather.base_url = "nope".into();
        assert!(App::with_config(config).is_err());
    }

    #[test]
    fn test_initialize_creates_database_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            config_dir: dir.path().join("nested"),
            ..Config::default()
        };

        let app = App::with_config(config).unwrap();
        app.initialize().unwrap();

        assert!(dir.path().join("nested").is_dir());
        assert!(app.warnings().is_empty());
    }
}
