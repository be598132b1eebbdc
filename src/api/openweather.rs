//! `OpenWeatherMap` API response structures and conversion utilities

use std::collections::HashMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::weather::DEFAULT_VISIBILITY_M;
use crate::models::{Location, PollutantReading, WeatherSnapshot};

/// One match from the direct geocoding endpoint
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeocodingResult {
    /// Location name
    pub name: String,
    /// Local names in different languages
    pub local_names: Option<HashMap<String, String>>,
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
    /// Country code
    pub country: Option<String>,
    /// State or region
    pub state: Option<String>,
}

impl From<GeocodingResult> for Location {
    fn from(geocoding: GeocodingResult) -> Self {
        Location {
            latitude: geocoding.lat,
            longitude: geocoding.lon,
            name: geocoding.name,
            country: geocoding.country,
            state: geocoding.state,
        }
    }
}

/// Response of `/air_pollution`
#[derive(Debug, Deserialize)]
pub struct AirPollutionResponse {
    #[serde(default)]
    pub list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionEntry {
    /// Unix timestamp of the observation
    pub dt: Option<i64>,
    pub main: Option<AirPollutionMain>,
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionMain {
    /// Coarse 1-5 category
    pub aqi: Option<u8>,
}

/// Pollutant concentrations in µg/m³
#[derive(Debug, Default, Deserialize)]
pub struct Components {
    pub co: Option<f64>,
    pub no: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub nh3: Option<f64>,
}

impl From<AirPollutionResponse> for PollutantReading {
    fn from(response: AirPollutionResponse) -> Self {
        // Only the current reading (first entry) is meaningful
        let Some(entry) = response.list.into_iter().next() else {
            return PollutantReading::default();
        };

        let components = entry.components;
        PollutantReading {
            category: entry.main.and_then(|main| main.aqi),
            observed_at: entry.dt.and_then(|dt| DateTime::from_timestamp(dt, 0)),
            pm2_5: components.pm2_5,
            pm10: components.pm10,
            no2: components.no2,
            o3: components.o3,
            co: components.co,
            so2: components.so2,
            no: components.no,
            nh3: components.nh3,
        }
    }
}

/// Response of `/weather`
#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    #[serde(default)]
    pub name: String,
    pub sys: Option<Sys>,
    pub main: WeatherMain,
    pub wind: Option<Wind>,
    /// Meters; omitted by the provider for some stations
    pub visibility: Option<u32>,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct Sys {
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherMain {
    pub temp: f64,
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub description: String,
}

impl From<CurrentWeatherResponse> for WeatherSnapshot {
    fn from(response: CurrentWeatherResponse) -> Self {
        WeatherSnapshot {
            name: response.name,
            country: response.sys.and_then(|sys| sys.country),
            temperature: response.main.temp,
            humidity: response.main.humidity,
            wind_speed: response.wind.map_or(0.0, |wind| wind.speed),
            visibility: response.visibility.unwrap_or(DEFAULT_VISIBILITY_M),
            description: response
                .weather
                .into_iter()
                .next()
                .map(|condition| condition.description)
                .unwrap_or_default(),
        }
    }
}

/// Error body returned alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
}
