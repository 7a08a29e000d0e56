//! Location Resolution Module
//!
//! This module turns location inputs (free text, coordinates, a GPS fix)
//! into structured [`Location`] records for a weather query.

use crate::WeatherGuardError;
use crate::geocode::{Geocoder, ReverseGeocode};
use crate::models::{InvalidCoordinates, Location};
use crate::models::location::format_coordinates;
use std::sync::Arc;
use tracing::{debug, warn};

/// A parsed location query
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Latitude, longitude in decimal degrees
    Coordinates(f64, f64),
    /// Free text: city, "City, ST", ZIP code
    Text(String),
}

impl LocationInput {
    /// Parse user input. Text that reads as an in-range `lat,lon` pair
    /// becomes coordinates; anything else non-empty is geocoded as text.
    pub fn parse(input: &str) -> crate::Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(WeatherGuardError::LocationRequired);
        }

        if let Some((lat, lon)) = parse_coordinates(input) {
            return Ok(Self::Coordinates(lat, lon));
        }

        Ok(Self::Text(input.to_string()))
    }
}

/// Parse "25.76,-80.19" or "25.76, -80.19"
fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
    let (lat, lon) = input.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lon = lon.trim().parse::<f64>().ok()?;
    Location::in_range(lat, lon).then_some((lat, lon))
}

/// Service for resolving location inputs
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Resolve a parsed input into a structured Location
    pub async fn resolve(&self, input: LocationInput) -> crate::Result<Location> {
        debug!("Resolving location input: {:?}", input);

        let location = match input {
            LocationInput::Coordinates(lat, lon) => self
                .resolve_coordinates(lat, lon)
                .await
                .map_err(|e| WeatherGuardError::location_not_found(e.to_string()))?,
            LocationInput::Text(query) => self.resolve_text(&query).await?,
        };

        debug!(
            "Resolved location: {} at ({}, {})",
            location.name(),
            location.latitude(),
            location.longitude()
        );

        Ok(location)
    }

    /// Forward-geocode free text. The best match supplies the coordinates;
    /// the display name stays the text the user typed.
    pub async fn resolve_text(&self, query: &str) -> crate::Result<Location> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherGuardError::LocationRequired);
        }
        debug!("Geocoding location name: {}", query);

        let candidates = self.geocoder.search(query).await.map_err(|e| {
            warn!("Geocoding '{}' failed: {}", query, e);
            WeatherGuardError::location_not_found(query)
        })?;

        let Some(best) = candidates.into_iter().next() else {
            return Err(WeatherGuardError::location_not_found(query));
        };
        debug!(
            "Found location: {} ({:.4}, {:.4})",
            best.display_name, best.latitude, best.longitude
        );

        Location::new(best.latitude, best.longitude, query).map_err(|e| {
            warn!("Geocoder returned unusable coordinates for '{}': {}", query, e);
            WeatherGuardError::location_not_found(query)
        })
    }

    /// Reverse-geocode a fix to a readable label. A failed lookup still
    /// yields a location, named by its rounded coordinates; the only error
    /// is coordinates that are out of range to begin with.
    pub async fn resolve_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Location, InvalidCoordinates> {
        if !Location::in_range(latitude, longitude) {
            return Err(InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        debug!("Resolving coordinates: ({}, {})", latitude, longitude);

        let name = match self.geocoder.reverse(latitude, longitude).await {
            Ok(reverse) => place_label(&reverse),
            Err(e) => {
                debug!("Reverse geocoding failed: {}, using coordinates as name", e);
                None
            }
        }
        .unwrap_or_else(|| format_coordinates(latitude, longitude, 2));

        Location::new(latitude, longitude, name)
    }
}

/// City, then town, then county (each with the state), then the first two
/// segments of the display name
fn place_label(reverse: &ReverseGeocode) -> Option<String> {
    let address = &reverse.address;
    let with_state = |place: &Option<String>| match (place, &address.state) {
        (Some(place), Some(state)) if !place.is_empty() && !state.is_empty() => {
            Some(format!("{place}, {state}"))
        }
        _ => None,
    };

    with_state(&address.city)
        .or_else(|| with_state(&address.town))
        .or_else(|| with_state(&address.county))
        .or_else(|| {
            reverse
                .display_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(|name| name.split(',').take(2).collect::<Vec<_>>().join(","))
        })
}
