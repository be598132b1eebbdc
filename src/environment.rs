//! Environmental data fetching
//!
//! Pollution and weather for the same coordinates are requested concurrently
//! and joined all-or-nothing: the first failure wins and nothing partial is
//! returned.

use tracing::{info, warn};

use crate::Result;
use crate::api::EnvironmentProvider;
use crate::models::{Location, PollutantReading, WeatherSnapshot};

/// Fetch pollution and weather for a location concurrently
pub async fn fetch_environmental_data<P: EnvironmentProvider>(
    provider: &P,
    location: &Location,
) -> Result<(PollutantReading, WeatherSnapshot)> {
    info!(
        "Fetching air quality and weather for {} ({})",
        location.name,
        location.format_coordinates()
    );

    tokio::try_join!(
        provider.air_pollution(location),
        provider.current_weather(location)
    )
    .inspect_err(|e| warn!("Environmental data fetch failed: {}", e))
}
