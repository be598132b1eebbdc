//! Error types and handling for the air quality lookup

use serde::Serialize;
use thiserror::Error;

/// Fallback text when an upstream error response carries no message
const UNKNOWN_API_ERROR: &str = "Unknown API error";

/// Main error type for the air quality lookup
#[derive(Error, Debug)]
pub enum AirQualityError {
    /// Missing or invalid configuration (e.g. no API key)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// City name missing or blank
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Geocoding produced no match, or the upstream answered 404
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Upstream rejected the credential (HTTP 401)
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Upstream throttled the client (HTTP 429)
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// Request never reached the upstream or timed out
    #[error("Network error: {message}")]
    Network { message: String },

    /// Any other non-2xx response, or a body that could not be decoded
    #[error("Upstream error ({status}): {}", .message.as_deref().unwrap_or(UNKNOWN_API_ERROR))]
    Upstream {
        status: u16,
        message: Option<String>,
    },
}

/// Stable machine-readable error codes, used in logs and JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ConfigError,
    InputEmptyCity,
    ApiLocationNotFound,
    ApiUnauthorized,
    ApiRateLimit,
    ApiNetworkError,
    ApiUpstreamError,
}

impl AirQualityError {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new input validation error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn rate_limited<S: Into<String>>(message: S) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an upstream error; blank messages are dropped
    pub fn upstream(status: u16, message: Option<String>) -> Self {
        Self::Upstream {
            status,
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    /// Machine-readable code for this error
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Configuration { .. } => ErrorCode::ConfigError,
            Self::InvalidInput { .. } => ErrorCode::InputEmptyCity,
            Self::NotFound { .. } => ErrorCode::ApiLocationNotFound,
            Self::Unauthorized { .. } => ErrorCode::ApiUnauthorized,
            Self::RateLimited { .. } => ErrorCode::ApiRateLimit,
            Self::Network { .. } => ErrorCode::ApiNetworkError,
            Self::Upstream { .. } => ErrorCode::ApiUpstreamError,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration { message } => message.clone(),
            Self::InvalidInput { .. } => "Please enter a city name.".to_string(),
            Self::NotFound { .. } => {
                "City not found. Please check the spelling and try again.".to_string()
            }
            Self::Unauthorized { .. } => {
                "Invalid API key. Please check your OpenWeatherMap API key.".to_string()
            }
            Self::RateLimited { .. } => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            Self::Network { .. } => {
                "Network error. Please check your internet connection.".to_string()
            }
            Self::Upstream { status, message } => format!(
                "API Error ({status}): {}",
                message.as_deref().unwrap_or(UNKNOWN_API_ERROR)
            ),
        }
    }
}
