//! Latest station observation, normalised to SI units

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A station reading. Every measurement is optional: stations routinely
/// report nulls for sensors they lack or readings that failed QC.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Observation {
    pub station_id: Option<String>,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub temperature_c: Option<f64>,
    pub wind_chill_c: Option<f64>,
    pub heat_index_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub pressure_pa: Option<f64>,
    pub visibility_m: Option<f64>,
    pub text_description: String,
}

impl Observation {
    /// Apparent temperature: wind chill, then heat index, then the raw reading
    #[must_use]
    pub fn feels_like_c(&self) -> Option<f64> {
        self.wind_chill_c
            .or(self.heat_index_c)
            .or(self.temperature_c)
    }
}

/// What became of the current-conditions lookup.
///
/// Never an error for the query as a whole; the variants keep "no station"
/// apart from "station lookup failed".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ObservationOutcome {
    Reported { observation: Observation },
    NoStation,
    Unavailable { reason: String },
}

impl ObservationOutcome {
    #[must_use]
    pub fn observation(&self) -> Option<&Observation> {
        match self {
            Self::Reported { observation } => Some(observation),
            Self::NoStation | Self::Unavailable { .. } => None,
        }
    }
}
