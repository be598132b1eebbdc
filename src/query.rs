//! Query handling
//!
//! A query runs resolve -> fetch -> compute and produces a new `QueryState`
//! snapshot. `QueryController` owns the latest-result slot, tags every query
//! with a sequence number and drops completions that a newer query has
//! superseded. Subscribers observe state transitions through a watch channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{Span, debug, info, instrument, warn};

use crate::aqi::{AirQualityIndex, AirQualityStatus};
use crate::api::EnvironmentProvider;
use crate::environment::fetch_environmental_data;
use crate::error::ErrorCode;
use crate::location_resolver::LocationResolver;
use crate::models::{Location, WeatherSnapshot};
use crate::{AirQualityError, Result};

/// Everything a successful query produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub location: Location,
    pub index: AirQualityIndex,
    pub weather: WeatherSnapshot,
}

/// User-facing error of a failed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&AirQualityError> for QueryError {
    fn from(err: &AirQualityError) -> Self {
        Self {
            code: err.code(),
            message: err.user_message(),
        }
    }
}

/// Snapshot of what the presentation layer should show
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryState {
    /// Sequence number of the query this state belongs to, 0 before any query
    pub sequence: u64,
    /// City name as submitted
    pub city: Option<String>,
    pub location: Option<Location>,
    pub index: Option<AirQualityIndex>,
    pub status: AirQualityStatus,
    pub weather: Option<WeatherSnapshot>,
    pub loading: bool,
    pub error: Option<QueryError>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            sequence: 0,
            city: None,
            location: None,
            index: None,
            status: AirQualityStatus::PLACEHOLDER,
            weather: None,
            loading: false,
            error: None,
        }
    }
}

impl QueryState {
    /// Query in flight; results and errors of earlier queries are cleared
    #[must_use]
    pub fn loading(sequence: u64, city: &str) -> Self {
        Self {
            sequence,
            city: Some(city.to_string()),
            loading: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn completed(sequence: u64, city: &str, result: QueryResult) -> Self {
        Self {
            sequence,
            city: Some(city.to_string()),
            status: result.index.status(),
            location: Some(result.location),
            index: Some(result.index),
            weather: Some(result.weather),
            loading: false,
            error: None,
        }
    }

    /// Failed query; no partial results survive
    #[must_use]
    pub fn failed(sequence: u64, city: &str, err: &AirQualityError) -> Self {
        Self {
            sequence,
            city: Some(city.to_string()),
            error: Some(QueryError::from(err)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Run one query end to end: configuration, geocoding, fetch, index
pub async fn run_query<P: EnvironmentProvider>(provider: &P, city: &str) -> Result<QueryResult> {
    provider.ensure_configured()?;

    let location = LocationResolver::resolve(provider, city).await?;
    let (reading, weather) = fetch_environmental_data(provider, &location).await?;
    let index = AirQualityIndex::from_reading(reading);

    debug!(
        "Index {} ({}) for {}",
        index.value,
        index.status().label,
        location.display_name()
    );

    Ok(QueryResult {
        location,
        index,
        weather,
    })
}

/// Owns the latest query state and publishes its transitions
pub struct QueryController<P> {
    provider: P,
    latest: AtomicU64,
    state: watch::Sender<QueryState>,
}

impl<P: EnvironmentProvider> QueryController<P> {
    pub fn new(provider: P) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            provider,
            latest: AtomicU64::new(0),
            state,
        }
    }

    /// Receive every published state transition
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    /// The most recently published state
    pub fn current(&self) -> QueryState {
        self.state.borrow().clone()
    }

    /// Submit a city name; returns the final state, or `None` when a newer
    /// query superseded this one before it completed
    #[instrument(name = "query", skip(self), fields(sequence = tracing::field::Empty))]
    pub async fn submit(&self, city: &str) -> Option<QueryState> {
        let sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Span::current().record("sequence", sequence);

        info!("Starting query for '{}'", city);
        let start = Instant::now();
        self.publish_if_latest(QueryState::loading(sequence, city));

        let next = match run_query(&self.provider, city).await {
            Ok(result) => {
                info!(
                    "Query finished in {:.3}s: AQI {} ({})",
                    start.elapsed().as_secs_f64(),
                    result.index.value,
                    result.index.status().label
                );
                QueryState::completed(sequence, city, result)
            }
            Err(err) => {
                warn!("Query failed [{:?}]: {}", err.code(), err);
                QueryState::failed(sequence, city, &err)
            }
        };

        if self.publish_if_latest(next.clone()) {
            Some(next)
        } else {
            info!("Discarding stale result of query {}", sequence);
            None
        }
    }

    /// Publish unless a newer query has been issued since `state` was tagged
    fn publish_if_latest(&self, state: QueryState) -> bool {
        // The check runs under the channel lock, so it cannot interleave
        // with a newer query's own publish
        self.state.send_if_modified(|current| {
            if self.latest.load(Ordering::SeqCst) != state.sequence {
                return false;
            }
            *current = state;
            true
        })
    }
}
