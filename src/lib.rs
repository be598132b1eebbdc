//! `AirQuality` - Air quality and weather lookup for any city
//!
//! This library resolves a city name to coordinates, fetches current
//! pollution and weather data from `OpenWeatherMap`, converts PM2.5 to a
//! US EPA style index and exposes the result as an observable query state.

pub mod api;
pub mod aqi;
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod query;

// Re-export core types for public API
pub use api::{EnvironmentProvider, GeocodingResult, OpenWeatherClient};
pub use aqi::{AirQualityIndex, AirQualityStatus, SeverityTier, classify, compute_index};
pub use config::AppConfig;
pub use error::{AirQualityError, ErrorCode};
pub use location_resolver::LocationResolver;
pub use models::{Location, Pollutant, PollutantReading, WeatherSnapshot};
pub use query::{QueryController, QueryState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AirQualityError>;
