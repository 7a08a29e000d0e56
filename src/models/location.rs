//! Location model for geographic coordinates and a display name

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coordinates outside the valid latitude/longitude ranges
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Coordinates out of range: {latitude}, {longitude}")]
pub struct InvalidCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A resolved place: display name plus WGS84 coordinates.
///
/// Immutable once built; the constructor enforces the coordinate ranges,
/// deserialization included.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "LocationFields")]
pub struct Location {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct LocationFields {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<LocationFields> for Location {
    type Error = InvalidCoordinates;

    fn try_from(fields: LocationFields) -> Result<Self, Self::Error> {
        Self::new(fields.latitude, fields.longitude, fields.name)
    }
}

impl Location {
    /// Create a new location, rejecting out-of-range coordinates
    pub fn new(
        latitude: f64,
        longitude: f64,
        name: impl Into<String>,
    ) -> Result<Self, InvalidCoordinates> {
        if !Self::in_range(latitude, longitude) {
            return Err(InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            name: name.into(),
            latitude,
            longitude,
        })
    }

    /// Whether the pair is a valid latitude/longitude
    #[must_use]
    pub fn in_range(latitude: f64, longitude: f64) -> bool {
        (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self, precision: usize) -> String {
        format_coordinates(self.latitude, self.longitude, precision)
    }

    /// Key used for the grid lookup: coordinates at 4 decimal places
    #[must_use]
    pub fn grid_key(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// `"lat, lon"` at the given number of decimal places
#[must_use]
pub fn format_coordinates(latitude: f64, longitude: f64, precision: usize) -> String {
    format!("{latitude:.precision$}, {longitude:.precision$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_rejects_out_of_range() {
        assert!(Location::new(90.5, 0.0, "North of north").is_err());
        assert!(Location::new(0.0, -180.5, "Past the dateline").is_err());
        assert!(Location::new(f64::NAN, 0.0, "Nowhere").is_err());
        assert!(Location::new(-90.0, 180.0, "Corner").is_ok());
    }

    #[test]
    fn test_deserialize_checks_range() {
        let location: Location =
            serde_json::from_str(r#"{"name":"Miami, FL","latitude":25.77,"longitude":-80.19}"#)
                .unwrap();
        assert_eq!(location.latitude(), 25.77);

        let result: Result<Location, _> =
            serde_json::from_str(r#"{"name":"Nowhere","latitude":91.0,"longitude":0.0}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Coordinates out of range"), "{err}");
    }

    #[test]
    fn test_location_grid_key() {
        let location = Location::new(25.774_26, -80.193_66, "Miami, FL").unwrap();
        assert_eq!(location.grid_key(), "25.7743,-80.1937");
        assert_eq!(location.name(), "Miami, FL");
    }

    #[test]
    fn test_format_coordinates() {
        assert_eq!(format_coordinates(47.606_2, -122.332_1, 2), "47.61, -122.33");
        let location = Location::new(46.818_2, 8.227_5, "Interlaken").unwrap();
        assert_eq!(location.format_coordinates(4), "46.8182, 8.2275");
    }
}
