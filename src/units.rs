//! Unit conversions for upstream SI readings
//!
//! Observation stations report metric values; the display side wants
//! Fahrenheit, mph, miles and a compass point.

/// 16-point compass rose, clockwise from north
pub const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const MPS_TO_MPH: f64 = 2.237;
const METERS_TO_MILES: f64 = 0.000_621_371;

#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

#[must_use]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

#[must_use]
pub fn meters_per_second_to_mph(speed: f64) -> f64 {
    speed * MPS_TO_MPH
}

#[must_use]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters * METERS_TO_MILES
}

#[must_use]
pub fn pascals_to_millibars(pascals: f64) -> f64 {
    pascals / 100.0
}

/// Convert a bearing in degrees to a 16-point compass direction.
///
/// Buckets are 22.5° wide and centred on each point. A bearing exactly on a
/// bucket edge rounds half up, so 11.25° is "NNE" and 348.75° wraps to "N".
/// Negative and >360° bearings wrap around the rose.
#[must_use]
pub fn degrees_to_compass(degrees: f64) -> &'static str {
    // NaN casts to 0 and lands on "N"
    let bucket = (degrees / 22.5 + 0.5).floor() as i64;
    COMPASS_POINTS[bucket.rem_euclid(16) as usize]
}
