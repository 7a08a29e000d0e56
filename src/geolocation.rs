//! Device position as a single awaitable result
//!
//! A provider either yields a fix or says why it cannot. Hosts without any
//! positioning support use [`NoGeolocation`]; a position pinned in the
//! configuration is served by [`FixedPosition`].

use crate::config::GeolocationConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A position fix in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    /// No positioning capability at all
    #[error("geolocation is not supported")]
    Unsupported,
    /// The user or platform refused access
    #[error("geolocation permission denied")]
    Denied,
}

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<GeoFix, GeolocationError>;
}

/// Provider for hosts with no positioning support
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    async fn current_position(&self) -> Result<GeoFix, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Provider that always reports the same fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition(pub GeoFix);

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<GeoFix, GeolocationError> {
        Ok(self.0)
    }
}

/// Pick a provider from configuration: a pinned fix, or none at all
#[must_use]
pub fn from_config(config: &GeolocationConfig) -> Box<dyn GeolocationProvider> {
    match (config.latitude, config.longitude) {
        (Some(latitude), Some(longitude)) => Box::new(FixedPosition(GeoFix {
            latitude,
            longitude,
        })),
        _ => Box::new(NoGeolocation),
    }
}
