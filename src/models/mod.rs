//! Data models for `WeatherGuard`
//!
//! This module contains the core domain models organized by concern:
//! - Location: a resolved place and its coordinates
//! - Forecast: forecast periods and the grid reference they come from
//! - Observation: the latest station reading
//! - Alert: active hazard alerts and their severity
//! - Snapshot: the aggregate handed to consumers

pub mod alert;
pub mod forecast;
pub mod location;
pub mod observation;
pub mod snapshot;

pub use alert::{Alert, AlertGeometry, Severity};
pub use forecast::{ForecastPeriod, GridReference};
pub use location::{InvalidCoordinates, Location};
pub use observation::{Observation, ObservationOutcome};
pub use snapshot::WeatherSnapshot;
