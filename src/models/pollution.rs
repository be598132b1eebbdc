//! Pollutant concentrations as reported by the air pollution API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pollutants that contribute to the air quality display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    Pm2_5,
    Pm10,
    No2,
    O3,
    Co,
    So2,
}

impl Pollutant {
    /// Display order of the pollutant details
    pub const DISPLAY_ORDER: [Pollutant; 6] = [
        Pollutant::Pm2_5,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::O3,
        Pollutant::Co,
        Pollutant::So2,
    ];

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Pollutant::Pm2_5 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO₂",
            Pollutant::O3 => "O₃",
            Pollutant::Co => "CO",
            Pollutant::So2 => "SO₂",
        }
    }

    /// Unit used for display; CO is shown in mg/m³, the rest in µg/m³
    #[must_use]
    pub fn display_unit(self) -> &'static str {
        match self {
            Pollutant::Co => "mg/m³",
            _ => "μg/m³",
        }
    }

    /// Format a raw µg/m³ concentration in this pollutant's display unit
    #[must_use]
    pub fn format_concentration(self, micrograms: f64) -> String {
        match self {
            Pollutant::Co => format!("{:.2} {}", micrograms / 1000.0, self.display_unit()),
            _ => format!("{:.1} {}", micrograms, self.display_unit()),
        }
    }
}

/// A single current reading; every field depends on provider completeness
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    /// Provider's coarse 1-5 air quality bucket
    pub category: Option<u8>,
    /// Observation time reported by the provider
    pub observed_at: Option<DateTime<Utc>>,
    /// Fine particulate matter, µg/m³
    pub pm2_5: Option<f64>,
    /// Coarse particulate matter, µg/m³
    pub pm10: Option<f64>,
    /// Nitrogen dioxide, µg/m³
    pub no2: Option<f64>,
    /// Ozone, µg/m³
    pub o3: Option<f64>,
    /// Carbon monoxide, µg/m³
    pub co: Option<f64>,
    /// Sulphur dioxide, µg/m³
    pub so2: Option<f64>,
    /// Nitrogen monoxide, µg/m³ (carried, not displayed)
    pub no: Option<f64>,
    /// Ammonia, µg/m³ (carried, not displayed)
    pub nh3: Option<f64>,
}

impl PollutantReading {
    /// Concentration of a pollutant in µg/m³, when reported
    #[must_use]
    pub fn concentration(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm2_5 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::No2 => self.no2,
            Pollutant::O3 => self.o3,
            Pollutant::Co => self.co,
            Pollutant::So2 => self.so2,
        }
    }

    /// Pollutants worth showing: reported and non-zero, in display order
    pub fn displayed(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        Pollutant::DISPLAY_ORDER.into_iter().filter_map(|pollutant| {
            self.concentration(pollutant)
                .filter(|value| *value != 0.0)
                .map(|value| (pollutant, value))
        })
    }

    /// True when the provider reported no concentrations at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Pollutant::DISPLAY_ORDER
            .iter()
            .all(|p| self.concentration(*p).is_none())
    }
}
