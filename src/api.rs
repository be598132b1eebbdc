//! HTTP client for the `OpenWeatherMap` APIs
//!
//! This module provides the client used for geocoding, air pollution and
//! current weather lookups, and maps HTTP failures onto the crate's error
//! taxonomy. Requests are never retried.

pub mod openweather;

use std::time::Instant;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ApiConfig;
use crate::models::{Location, PollutantReading, WeatherSnapshot};
use crate::{AirQualityError, Result};
pub use openweather::GeocodingResult;

/// Geocoding requests are restricted to the single best match
pub const GEOCODE_LIMIT: u8 = 1;

/// Requests slower than this are logged as a warning
const SLOW_REQUEST_SECS: u64 = 5;

/// Source of geocoding, pollution and weather data
pub trait EnvironmentProvider {
    /// Fails with a configuration error when no request may be issued
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }

    /// Candidate matches for a place name, best first
    async fn geocode(&self, city: &str) -> Result<Vec<GeocodingResult>>;

    /// Current pollutant concentrations at a location
    async fn air_pollution(&self, location: &Location) -> Result<PollutantReading>;

    /// Current weather conditions at a location
    async fn current_weather(&self, location: &Location) -> Result<WeatherSnapshot>;
}

/// `OpenWeatherMap` API client
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    /// HTTP client, shared connection pool
    client: Client,
    /// API configuration
    api: ApiConfig,
}

impl OpenWeatherClient {
    /// Create a new client
    pub fn new(api: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(api.timeout())
            .user_agent(concat!("airquality/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AirQualityError::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, api })
    }

    fn geocode_url(&self, city: &str, key: &str) -> String {
        format!(
            "{}/direct?q={}&limit={}&appid={}",
            self.api.geo_base_url,
            urlencoding::encode(city),
            GEOCODE_LIMIT,
            urlencoding::encode(key)
        )
    }

    fn air_pollution_url(&self, location: &Location, key: &str) -> String {
        format!(
            "{}/air_pollution?lat={}&lon={}&appid={}",
            self.api.data_base_url,
            location.latitude,
            location.longitude,
            urlencoding::encode(key)
        )
    }

    fn weather_url(&self, location: &Location, key: &str) -> String {
        format!(
            "{}/weather?lat={}&lon={}&appid={}&units={}",
            self.api.data_base_url,
            location.latitude,
            location.longitude,
            urlencoding::encode(key),
            self.api.units
        )
    }

    /// Issue a GET and decode the JSON body, mapping failures to error variants
    #[instrument(skip(self, url), fields(url = %redact_key(url)))]
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let start = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Network error after {:.3}s: {}", start.elapsed().as_secs_f64(), e);
            AirQualityError::network(redact_key(&e.to_string()))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read response body: {}", e);
            AirQualityError::network(redact_key(&e.to_string()))
        })?;

        let elapsed = start.elapsed();
        debug!("HTTP {} in {:.3}s", status, elapsed.as_secs_f64());
        if elapsed.as_secs() > SLOW_REQUEST_SECS {
            warn!("Slow API response detected: {:.3}s", elapsed.as_secs_f64());
        }

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse response: {}", e);
            AirQualityError::upstream(status.as_u16(), Some(format!("Invalid response body: {e}")))
        })
    }
}

impl EnvironmentProvider for OpenWeatherClient {
    fn ensure_configured(&self) -> Result<()> {
        self.api.require_api_key().map(|_| ())
    }

    #[instrument(skip(self))]
    async fn geocode(&self, city: &str) -> Result<Vec<GeocodingResult>> {
        let key = self.api.require_api_key()?;
        let results: Vec<GeocodingResult> = self.get_json(&self.geocode_url(city, key)).await?;

        if results.is_empty() {
            warn!("No results found for location '{}'", city);
        } else {
            info!("Found {} geocoding results for '{}'", results.len(), city);
            debug!(
                "Geocoding results: {:?}",
                results
                    .iter()
                    .map(|r| format!("{} ({:.4}, {:.4})", r.name, r.lat, r.lon))
                    .collect::<Vec<_>>()
            );
        }

        Ok(results)
    }

    #[instrument(skip(self, location), fields(lat = location.latitude, lon = location.longitude))]
    async fn air_pollution(&self, location: &Location) -> Result<PollutantReading> {
        let key = self.api.require_api_key()?;
        let response: openweather::AirPollutionResponse =
            self.get_json(&self.air_pollution_url(location, key)).await?;

        let reading = PollutantReading::from(response);
        if reading.is_empty() {
            warn!("No pollutant concentrations reported for {}", location.name);
        }
        debug!(
            "Pollution reading: category={:?} pm2_5={:?}",
            reading.category, reading.pm2_5
        );
        Ok(reading)
    }

    #[instrument(skip(self, location), fields(lat = location.latitude, lon = location.longitude))]
    async fn current_weather(&self, location: &Location) -> Result<WeatherSnapshot> {
        let key = self.api.require_api_key()?;
        let response: openweather::CurrentWeatherResponse =
            self.get_json(&self.weather_url(location, key)).await?;

        let weather = WeatherSnapshot::from(response);
        debug!("Weather at {}: {}", weather.format_place(), weather.description);
        Ok(weather)
    }
}

/// Map a non-2xx status and its body to an error
fn status_error(status: StatusCode, body: &str) -> AirQualityError {
    let message = serde_json::from_str::<openweather::ErrorResponse>(body)
        .ok()
        .and_then(|e| e.message);

    match status {
        StatusCode::UNAUTHORIZED => {
            error!("API authentication failed (HTTP 401)");
            AirQualityError::unauthorized(message.unwrap_or_else(|| "HTTP 401".to_string()))
        }
        StatusCode::NOT_FOUND => {
            warn!("Location not found (HTTP 404)");
            AirQualityError::not_found(message.unwrap_or_else(|| "HTTP 404".to_string()))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("Server rate limit exceeded (HTTP 429)");
            AirQualityError::rate_limited(message.unwrap_or_else(|| "HTTP 429".to_string()))
        }
        _ => {
            warn!("API request failed with status: {}", status);
            AirQualityError::upstream(status.as_u16(), message)
        }
    }
}

/// Mask the `appid` query parameter so the key never reaches the logs
#[must_use]
pub fn redact_key(text: &str) -> String {
    let mut redacted = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("appid=") {
        let (head, tail) = rest.split_at(pos + "appid=".len());
        redacted.push_str(head);
        redacted.push_str("***");
        let end = tail.find(['&', ' ', ')', '"']).unwrap_or(tail.len());
        rest = &tail[end..];
    }
    redacted.push_str(rest);
    redacted
}
