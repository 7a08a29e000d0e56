//! Current conditions for display
//!
//! Prefers the station observation; without one, the first forecast period
//! stands in for temperature, condition and wind.

use crate::models::{ForecastPeriod, Observation, WeatherSnapshot};
use crate::units;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionsSource {
    Observed,
    Forecast,
}

/// Display-ready current conditions, Fahrenheit and imperial units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub source: ConditionsSource,
    pub temperature_f: Option<i64>,
    pub condition: String,
    pub feels_like_f: Option<i64>,
    pub humidity_pct: Option<i64>,
    /// e.g. "12 mph NE"
    pub wind: Option<String>,
    pub pressure_mb: Option<f64>,
    pub visibility_mi: Option<f64>,
}

impl CurrentConditions {
    #[must_use]
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Self {
        let first = snapshot.forecast().first();
        match snapshot.current() {
            Some(observation) => Self::observed(observation, first),
            None => Self::forecast(first),
        }
    }

    #[must_use]
    pub fn observed(observation: &Observation, first_period: Option<&ForecastPeriod>) -> Self {
        let to_f = |c: f64| units::celsius_to_fahrenheit(c).round() as i64;

        let condition = if observation.text_description.is_empty() {
            first_period
                .map(|p| p.short_forecast.clone())
                .unwrap_or_default()
        } else {
            observation.text_description.clone()
        };

        let wind = observation.wind_speed_mps.map(|mps| {
            let mph = units::meters_per_second_to_mph(mps).round() as i64;
            match observation.wind_direction_deg {
                Some(deg) => format!("{mph} mph {}", units::degrees_to_compass(deg)),
                None => format!("{mph} mph"),
            }
        });

        Self {
            source: ConditionsSource::Observed,
            temperature_f: observation.temperature_c.map(to_f),
            condition,
            feels_like_f: observation.feels_like_c().map(to_f),
            humidity_pct: observation.humidity_pct.map(|h| h.round() as i64),
            wind,
            pressure_mb: observation
                .pressure_pa
                .map(|pa| round_tenth(units::pascals_to_millibars(pa))),
            visibility_mi: observation
                .visibility_m
                .map(|m| round_tenth(units::meters_to_miles(m))),
        }
    }

    #[must_use]
    pub fn forecast(first_period: Option<&ForecastPeriod>) -> Self {
        let temperature_f = first_period.map(|p| {
            if p.temperature_unit.eq_ignore_ascii_case("C") {
                units::celsius_to_fahrenheit(f64::from(p.temperature)).round() as i64
            } else {
                i64::from(p.temperature)
            }
        });

        Self {
            source: ConditionsSource::Forecast,
            temperature_f,
            condition: first_period
                .map(|p| p.short_forecast.clone())
                .unwrap_or_default(),
            feels_like_f: temperature_f,
            humidity_pct: None,
            wind: first_period
                .map(|p| p.wind_speed.clone())
                .filter(|w| !w.is_empty()),
            pressure_mb: None,
            visibility_mi: None,
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn or_dashes<T: fmt::Display>(value: Option<T>, unit: &str) -> String {
    value.map_or_else(|| format!("--{unit}"), |v| format!("{v}{unit}"))
}

impl fmt::Display for CurrentConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", or_dashes(self.temperature_f, "°F"), self.condition)?;
        writeln!(f, "  Feels like  {}", or_dashes(self.feels_like_f, "°F"))?;
        writeln!(f, "  Humidity    {}", or_dashes(self.humidity_pct, "%"))?;
        writeln!(f, "  Wind        {}", self.wind.as_deref().unwrap_or("-- mph"))?;
        writeln!(
            f,
            "  Pressure    {}",
            or_dashes(self.pressure_mb.map(|p| format!("{p:.1}")), " mb")
        )?;
        write!(
            f,
            "  Visibility  {}",
            or_dashes(self.visibility_mi.map(|v| format!("{v:.1}")), " mi")
        )
    }
}
