//! Data models for the air quality lookup
//!
//! This module contains the domain models organized by concern:
//! - Location: Geographic coordinates and metadata
//! - Pollution: Pollutant concentrations and the provider's coarse category
//! - Weather: Current weather conditions

pub mod location;
pub mod pollution;
pub mod weather;

// Re-export all public types for convenient access
pub use location::Location;
pub use pollution::{Pollutant, PollutantReading};
pub use weather::WeatherSnapshot;
