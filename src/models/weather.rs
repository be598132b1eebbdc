//! Current weather snapshot and display methods

use serde::{Deserialize, Serialize};

/// Visibility assumed when the provider omits it, in meters
pub const DEFAULT_VISIBILITY_M: u32 = 10_000;

/// Current weather conditions at the queried location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Station or place name reported by the weather API
    pub name: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country: Option<String>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Visibility in meters
    pub visibility: u32,
    /// Human-readable description of weather conditions
    pub description: String,
}

impl WeatherSnapshot {
    /// "Name, CC", or just the name when the country is unknown
    #[must_use]
    pub fn format_place(&self) -> String {
        match &self.country {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }

    /// Visibility rounded to whole kilometers
    #[must_use]
    pub fn format_visibility(&self) -> String {
        format!("{} km", (f64::from(self.visibility) / 1000.0).round())
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{}%", self.humidity)
    }

    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{} m/s", self.wind_speed)
    }

    /// Temperature rounded to whole degrees
    #[must_use]
    pub fn format_temperature(&self) -> String {
        // `+ 0.0` folds -0 into 0
        format!("{}°C", self.temperature.round() + 0.0)
    }
}
