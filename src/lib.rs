//! `WeatherGuard` - Emergency weather awareness
//!
//! This library resolves a place, gathers its National Weather Service
//! forecast, observation and active alerts, and ranks those alerts into a
//! single hazard view.

pub mod conditions;
pub mod config;
pub mod error;
pub mod geocode;
pub mod geolocation;
pub mod http;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod nws;
pub mod orchestrator;
pub mod triage;
pub mod units;
pub mod weather_source;

// Re-export core types for public API
pub use conditions::CurrentConditions;
pub use config::WeatherGuardConfig;
pub use error::{SourceError, WeatherGuardError};
pub use geocode::{Geocoder, NominatimClient};
pub use geolocation::{GeolocationProvider, NoGeolocation};
pub use location_resolver::{LocationInput, LocationResolver};
pub use models::{Alert, ForecastPeriod, Location, Observation, Severity, WeatherSnapshot};
pub use nws::{NwsClient, WeatherApi};
pub use orchestrator::{Orchestrator, QueryOutcome, QueryState, Session};
pub use triage::{AlertStatus, Triage, triage};
pub use weather_source::WeatherSourceClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherGuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
