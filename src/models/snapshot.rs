//! The aggregate result of one completed query

use super::{Alert, ForecastPeriod, GridReference, Location, Observation, ObservationOutcome};
use crate::triage::{AlertStatus, Triage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything one successful query produced.
///
/// Built only once forecast and hourly data are in hand; replaced wholesale
/// by the next query, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    location: Location,
    grid: GridReference,
    forecast: Vec<ForecastPeriod>,
    hourly: Vec<ForecastPeriod>,
    alerts: Vec<Alert>,
    banner: Option<Alert>,
    current: ObservationOutcome,
    fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    #[must_use]
    pub fn new(
        location: Location,
        grid: GridReference,
        forecast: Vec<ForecastPeriod>,
        hourly: Vec<ForecastPeriod>,
        triage: Triage,
        current: ObservationOutcome,
    ) -> Self {
        Self {
            location,
            grid,
            forecast,
            hourly,
            alerts: triage.sorted,
            banner: triage.banner,
            current,
            fetched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn grid(&self) -> &GridReference {
        &self.grid
    }

    #[must_use]
    pub fn forecast(&self) -> &[ForecastPeriod] {
        &self.forecast
    }

    #[must_use]
    pub fn hourly(&self) -> &[ForecastPeriod] {
        &self.hourly
    }

    /// Active alerts, most severe first
    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    #[must_use]
    pub fn banner(&self) -> Option<&Alert> {
        self.banner.as_ref()
    }

    #[must_use]
    pub fn alert_status(&self) -> AlertStatus {
        AlertStatus::of(&self.alerts, self.banner.as_ref())
    }

    /// Latest station observation, if one was obtained
    #[must_use]
    pub fn current(&self) -> Option<&Observation> {
        self.current.observation()
    }

    #[must_use]
    pub fn observation_outcome(&self) -> &ObservationOutcome {
        &self.current
    }

    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}
