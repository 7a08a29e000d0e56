//! Forecast periods and the grid reference that locates them

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One forecast period as published upstream.
///
/// Sequences of periods keep upstream (chronological) order and are never
/// re-sorted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    /// "Tonight", "Wednesday", or empty for hourly periods
    #[serde(default)]
    pub name: String,
    pub start_time: DateTime<FixedOffset>,
    /// Temperature in `temperature_unit` (Fahrenheit unless asked otherwise)
    pub temperature: i32,
    #[serde(default = "default_temperature_unit")]
    pub temperature_unit: String,
    pub is_daytime: bool,
    pub short_forecast: String,
    /// Free-form, e.g. "5 to 10 mph"
    #[serde(default)]
    pub wind_speed: String,
    #[serde(default)]
    pub wind_direction: String,
}

fn default_temperature_unit() -> String {
    "F".to_string()
}

impl ForecastPeriod {
    /// Wind string the way it is shown, e.g. "10 mph SW"
    #[must_use]
    pub fn format_wind(&self) -> String {
        match (self.wind_speed.is_empty(), self.wind_direction.is_empty()) {
            (true, _) => "-- mph".to_string(),
            (false, true) => self.wind_speed.clone(),
            (false, false) => format!("{} {}", self.wind_speed, self.wind_direction),
        }
    }
}

/// Upstream grid cell for a point, with the resources it links to.
///
/// Only lives for one query.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GridReference {
    /// Forecast office identifier, e.g. "MFL"
    pub office: Option<String>,
    pub grid_x: Option<i64>,
    pub grid_y: Option<i64>,
    pub forecast_url: String,
    pub forecast_hourly_url: String,
    pub observation_stations_url: String,
}

/// The first `limit` periods, in upstream order
#[must_use]
pub fn window(periods: &[ForecastPeriod], limit: usize) -> &[ForecastPeriod] {
    &periods[..periods.len().min(limit)]
}
