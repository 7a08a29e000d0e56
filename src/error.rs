//! Error types and handling for `WeatherGuard`
//!
//! Two layers: [`SourceError`] describes what went wrong talking to an
//! upstream service, [`WeatherGuardError`] is the small set of categories a
//! user ever sees.

use thiserror::Error;

/// User-facing error categories for a weather query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherGuardError {
    /// The query was empty or whitespace only
    #[error("Location required")]
    LocationRequired,

    /// Forward geocoding produced no usable match
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    /// No geolocation capability is available on this host
    #[error("Geolocation is not supported")]
    GeolocationUnsupported,

    /// The geolocation fix could not be obtained
    #[error("Geolocation access denied")]
    GeolocationDenied,

    /// A fatal upstream weather fetch failed
    #[error("Weather data unavailable: {message}")]
    WeatherDataUnavailable { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherGuardError {
    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    /// Create a new weather-data-unavailable error
    pub fn weather_unavailable<S: Into<String>>(message: S) -> Self {
        Self::WeatherDataUnavailable {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Short heading for the error state
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::LocationRequired => "Location Required",
            Self::LocationNotFound { .. } => "Location Not Found",
            Self::GeolocationUnsupported => "Geolocation Not Supported",
            Self::GeolocationDenied => "Location Access Denied",
            Self::WeatherDataUnavailable { .. } => "Weather Data Unavailable",
            Self::Config { .. } => "Configuration Error",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::LocationRequired => "Please enter a city, state, or ZIP code.".to_string(),
            Self::LocationNotFound { query } => format!(
                "Unable to find weather data for \"{query}\". Please try a different location or use your current location."
            ),
            Self::GeolocationUnsupported => {
                "Location detection is not available. Please enter a location manually."
                    .to_string()
            }
            Self::GeolocationDenied => {
                "Please enable location access or enter a location manually.".to_string()
            }
            Self::WeatherDataUnavailable { .. } => {
                "Unable to fetch weather data for this location. Please try again shortly."
                    .to_string()
            }
            Self::Config { message } => format!("Configuration error: {message}"),
        }
    }

    /// Whether re-running the same request may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LocationNotFound { .. }
                | Self::GeolocationDenied
                | Self::WeatherDataUnavailable { .. }
        )
    }
}

/// Failures talking to an upstream service
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    #[error("Observation unavailable: {0}")]
    ObservationUnavailable(String),
}

impl SourceError {
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WeatherGuardError::location_not_found("Atlantis");
        assert!(matches!(err, WeatherGuardError::LocationNotFound { .. }));

        let err = WeatherGuardError::weather_unavailable("grid lookup failed");
        assert!(matches!(err, WeatherGuardError::WeatherDataUnavailable { .. }));

        let err = WeatherGuardError::config("bad url");
        assert!(matches!(err, WeatherGuardError::Config { .. }));
    }

    #[test]
    fn test_user_messages() {
        let err = WeatherGuardError::location_not_found("Atlantis");
        assert!(err.user_message().contains("\"Atlantis\""));
        assert_eq!(err.title(), "Location Not Found");

        assert!(
            WeatherGuardError::LocationRequired
                .user_message()
                .contains("ZIP code")
        );
        assert_eq!(
            WeatherGuardError::GeolocationDenied.title(),
            "Location Access Denied"
        );
    }

    #[test]
    fn test_retry_affordance() {
        assert!(WeatherGuardError::weather_unavailable("x").is_retryable());
        assert!(WeatherGuardError::location_not_found("x").is_retryable());
        assert!(!WeatherGuardError::GeolocationUnsupported.is_retryable());
        assert!(!WeatherGuardError::LocationRequired.is_retryable());
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Status {
            status: 503,
            url: "https://api.weather.gov/points/1,2".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from https://api.weather.gov/points/1,2");
        assert!(SourceError::MissingField("properties.forecast")
            .to_string()
            .contains("properties.forecast"));
    }
}
