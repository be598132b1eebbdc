//! Location Resolution Module
//!
//! This module resolves a free-text city name into a structured Location
//! using the geocoding endpoint.

use crate::api::EnvironmentProvider;
use crate::models::Location;
use crate::{AirQualityError, Result};
use tracing::debug;

/// Service for resolving city names
pub struct LocationResolver;

impl LocationResolver {
    /// Validate a city name, returning it trimmed
    pub fn validate_city(city_name: &str) -> Result<&str> {
        let city = city_name.trim();
        if city.is_empty() {
            return Err(AirQualityError::invalid_input("City name cannot be empty"));
        }
        Ok(city)
    }

    /// Resolve a city name to coordinates via geocoding
    pub async fn resolve<P: EnvironmentProvider>(provider: &P, city_name: &str) -> Result<Location> {
        let city = Self::validate_city(city_name)?;
        debug!("Geocoding location name: {}", city);

        // Use the first (best) result
        let geocoding = provider
            .geocode(city)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AirQualityError::not_found(format!("Location not found: {city}")))?;

        debug!(
            "Found location: {} ({:.4}, {:.4})",
            geocoding.name, geocoding.lat, geocoding.lon
        );

        Ok(Location::from(geocoding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GeocodingResult;
    use crate::models::{PollutantReading, WeatherSnapshot};
    use std::sync::Mutex;

    /// Provider that answers geocoding from a fixed list and records queries
    struct FixedGeocoder {
        results: Vec<GeocodingResult>,
        queries: Mutex<Vec<String>>,
    }

    impl FixedGeocoder {
        fn new(results: Vec<GeocodingResult>) -> Self {
            Self {
                results,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    impl EnvironmentProvider for FixedGeocoder {
        async fn geocode(&self, city: &str) -> Result<Vec<GeocodingResult>> {
            self.queries.lock().unwrap().push(city.to_string());
            Ok(self.results.clone())
        }

        async fn air_pollution(&self, _location: &Location) -> Result<PollutantReading> {
            unreachable!("resolver never fetches pollution")
        }

        async fn current_weather(&self, _location: &Location) -> Result<WeatherSnapshot> {
            unreachable!("resolver never fetches weather")
        }
    }

    fn london() -> GeocodingResult {
        GeocodingResult {
            name: "London".to_string(),
            local_names: None,
            lat: 51.5073,
            lon: -0.1276,
            country: Some("GB".to_string()),
            state: Some("England".to_string()),
        }
    }

    #[tokio::test]
    async fn test_resolve_first_match() {
        let geocoder = FixedGeocoder::new(vec![london()]);

        let location = LocationResolver::resolve(&geocoder, "  London ").await.unwrap();
        assert_eq!(location.name, "London");
        assert_eq!(location.latitude, 51.5073);
        assert_eq!(*geocoder.queries.lock().unwrap(), vec!["London".to_string()]);
    }

    #[tokio::test]
    async fn test_resolve_rejects_blank_without_request() {
        let geocoder = FixedGeocoder::new(vec![london()]);

        for input in ["", "   ", "\t\n"] {
            let err = LocationResolver::resolve(&geocoder, input).await.unwrap_err();
            assert!(matches!(err, AirQualityError::InvalidInput { .. }));
        }
        assert!(geocoder.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_no_match_is_not_found() {
        let geocoder = FixedGeocoder::new(Vec::new());

        let err = LocationResolver::resolve(&geocoder, "Atlantis").await.unwrap_err();
        assert!(matches!(err, AirQualityError::NotFound { .. }));
        assert!(err.user_message().contains("check the spelling"));
    }
}
