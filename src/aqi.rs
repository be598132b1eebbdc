//! US EPA style air quality index
//!
//! Converts a PM2.5 concentration into a 0-500 index by piecewise linear
//! interpolation over the EPA breakpoints, falling back to the provider's
//! coarse 1-5 category when no PM2.5 reading is available.

use serde::{Deserialize, Serialize};

use crate::models::PollutantReading;

/// One PM2.5 breakpoint segment: concentration range (µg/m³) to index range
#[derive(Debug, Clone, Copy)]
struct Breakpoint {
    conc_low: f64,
    conc_high: f64,
    index_low: f64,
    index_high: f64,
}

impl Breakpoint {
    const fn new(conc_low: f64, conc_high: f64, index_low: f64, index_high: f64) -> Self {
        Self {
            conc_low,
            conc_high,
            index_low,
            index_high,
        }
    }

    fn interpolate(&self, pm25: f64) -> f64 {
        let slope = (self.index_high - self.index_low) / (self.conc_high - self.conc_low);
        self.index_low + slope * (pm25 - self.conc_low)
    }
}

/// EPA PM2.5 segments. The last one is also used above its upper bound.
static PM25_BREAKPOINTS: [Breakpoint; 6] = [
    Breakpoint::new(0.0, 12.0, 0.0, 50.0),
    Breakpoint::new(12.1, 35.4, 50.0, 100.0),
    Breakpoint::new(35.5, 55.4, 100.0, 150.0),
    Breakpoint::new(55.5, 150.4, 150.0, 200.0),
    Breakpoint::new(150.5, 250.4, 200.0, 300.0),
    Breakpoint::new(250.5, 500.4, 300.0, 500.0),
];

/// Index for a PM2.5 concentration in µg/m³.
///
/// Values above 500.4 continue along the final segment's slope instead of
/// being clamped at 500.
#[must_use]
pub fn pm25_to_index(pm25: f64) -> u16 {
    if pm25.is_nan() || pm25 <= 0.0 {
        return 0;
    }

    let last = PM25_BREAKPOINTS[PM25_BREAKPOINTS.len() - 1];
    let segment = PM25_BREAKPOINTS
        .iter()
        .find(|bp| pm25 <= bp.conc_high)
        .unwrap_or(&last);

    // `as` saturates at u16::MAX for runaway extrapolation
    segment.interpolate(pm25).round() as u16
}

/// Approximate index for the provider's coarse category
#[must_use]
pub fn category_to_index(category: Option<u8>) -> u16 {
    match category {
        Some(1) => 25,
        Some(2) => 75,
        Some(3) => 125,
        Some(4) => 175,
        Some(5) => 250,
        _ => 0,
    }
}

/// Index from PM2.5 when available, otherwise from the coarse category
#[must_use]
pub fn compute_index(category: Option<u8>, pm25: Option<f64>) -> u16 {
    match pm25 {
        Some(pm25) => pm25_to_index(pm25),
        None => category_to_index(category),
    }
}

/// A computed index together with the reading it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityIndex {
    /// Index value on the 0-500 scale
    pub value: u16,
    /// The provider's coarse category, if it reported one
    pub source_category: Option<u8>,
    /// Concentrations the index was computed from
    pub pollutants: PollutantReading,
}

impl AirQualityIndex {
    #[must_use]
    pub fn from_reading(pollutants: PollutantReading) -> Self {
        Self {
            value: compute_index(pollutants.category, pollutants.pm2_5),
            source_category: pollutants.category,
            pollutants,
        }
    }

    #[must_use]
    pub fn status(&self) -> AirQualityStatus {
        classify(Some(self.value))
    }
}

/// Health severity tiers of the index scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityTier {
    /// No index value available
    Unknown,
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl SeverityTier {
    /// Tier for an index value
    #[must_use]
    pub fn for_value(value: u16) -> Self {
        match value {
            0..=50 => SeverityTier::Good,
            51..=100 => SeverityTier::Moderate,
            101..=150 => SeverityTier::UnhealthyForSensitiveGroups,
            151..=200 => SeverityTier::Unhealthy,
            201..=300 => SeverityTier::VeryUnhealthy,
            _ => SeverityTier::Hazardous,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SeverityTier::Unknown => "--",
            SeverityTier::Good => "Good",
            SeverityTier::Moderate => "Moderate",
            SeverityTier::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            SeverityTier::Unhealthy => "Unhealthy",
            SeverityTier::VeryUnhealthy => "Very Unhealthy",
            SeverityTier::Hazardous => "Hazardous",
        }
    }

    /// Numeric tier, 0 for unknown through 6 for hazardous
    #[must_use]
    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Label and tier for an index value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AirQualityStatus {
    pub label: &'static str,
    pub severity_tier: SeverityTier,
}

impl AirQualityStatus {
    /// Placeholder status shown before any index is available
    pub const PLACEHOLDER: AirQualityStatus = AirQualityStatus {
        label: "--",
        severity_tier: SeverityTier::Unknown,
    };
}

/// Classify an index value; `None` yields the `--` placeholder
#[must_use]
pub fn classify(value: Option<u16>) -> AirQualityStatus {
    match value {
        Some(value) => {
            let severity_tier = SeverityTier::for_value(value);
            AirQualityStatus {
                label: severity_tier.label(),
                severity_tier,
            }
        }
        None => AirQualityStatus::PLACEHOLDER,
    }
}
