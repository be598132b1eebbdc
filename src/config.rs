//! Configuration management for the air quality lookup
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AirQualityError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variables accepted as the API key when none is configured
const FALLBACK_KEY_VARS: [&str; 2] = ["OPENWEATHER_API_KEY", "NEXT_PUBLIC_WEATHER_KEY"];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OpenWeatherMap API configuration
    pub api: ApiConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// OpenWeatherMap API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API credential; required before any request is issued
    pub key: Option<String>,
    /// Base URL of the geocoding API
    pub geo_base_url: String,
    /// Base URL of the pollution and weather APIs
    pub data_base_url: String,
    /// Unit system for weather requests
    pub units: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_geo_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_data_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_timeout() -> u32 {
    15
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            geo_base_url: default_geo_base_url(),
            data_base_url: default_data_base_url(),
            units: default_units(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// The configured API key, or a configuration error when it is absent
    pub fn require_api_key(&self) -> crate::Result<&str> {
        match self.key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(AirQualityError::configuration(
                "API key is missing. Please check your environment variables.",
            )),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // AIRQUALITY_API__KEY, AIRQUALITY_LOGGING__LEVEL, ...
        // Values stay strings; numeric fields are converted on deserialize
        builder = builder.add_source(
            Environment::with_prefix("AIRQUALITY")
                .prefix_separator("_")
                .separator("__"),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.api.key.is_none() {
            config.api.key = fallback_api_key(|name| std::env::var(name).ok());
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("airquality").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.api.geo_base_url.is_empty() {
            self.api.geo_base_url = default_geo_base_url();
        }
        if self.api.data_base_url.is_empty() {
            self.api.data_base_url = default_data_base_url();
        }
        if self.api.units.is_empty() {
            self.api.units = default_units();
        }
        if self.api.timeout_seconds == 0 {
            self.api.timeout_seconds = default_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        // Trailing slashes would double up when joining endpoint paths
        self.api.geo_base_url = self.api.geo_base_url.trim_end_matches('/').to_string();
        self.api.data_base_url = self.api.data_base_url.trim_end_matches('/').to_string();
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> crate::Result<()> {
        if self.api.timeout_seconds > 300 {
            return Err(AirQualityError::configuration(
                "API timeout cannot exceed 300 seconds",
            ));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> crate::Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AirQualityError::configuration(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AirQualityError::configuration(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        let valid_units = ["metric", "imperial", "standard"];
        if !valid_units.contains(&self.api.units.as_str()) {
            return Err(AirQualityError::configuration(format!(
                "Invalid unit system '{}'. Must be one of: {}",
                self.api.units,
                valid_units.join(", ")
            )));
        }

        for url in [&self.api.geo_base_url, &self.api.data_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AirQualityError::configuration(format!(
                    "API base URL must be a valid HTTP or HTTPS URL, got '{url}'"
                )));
            }
        }

        Ok(())
    }
}

/// First non-blank value among the fallback key variables
fn fallback_api_key(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    FALLBACK_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
}
