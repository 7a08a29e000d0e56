//! Configuration management for `WeatherGuard`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherGuardError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for `WeatherGuard`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherGuardConfig {
    /// Outbound HTTP settings shared by every upstream client
    #[serde(default)]
    pub http: HttpConfig,
    /// Upstream service locations
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    /// How much of the forecast a consumer is shown
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Optional fixed position used as the geolocation source
    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Identifying string sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Upstream service base URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Nominatim-compatible geocoding service
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,
    /// National Weather Service API
    #[serde(default = "default_nws_base_url")]
    pub nws_base_url: String,
}

/// Display windows over the forecast sequences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Number of forecast periods shown (day and night count separately)
    #[serde(default = "default_forecast_periods")]
    pub forecast_periods: usize,
    /// Number of hourly periods shown
    #[serde(default = "default_hourly_periods")]
    pub hourly_periods: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Fixed geolocation fix, for hosts without a positioning service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeolocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// Default value functions
fn default_user_agent() -> String {
    format!("WeatherGuard/{} (emergency weather awareness)", crate::VERSION)
}

fn default_timeout() -> u32 {
    15
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_nws_base_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_forecast_periods() -> usize {
    14
}

fn default_hourly_periods() -> usize {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            geocoding_base_url: default_geocoding_base_url(),
            nws_base_url: default_nws_base_url(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            forecast_periods: default_forecast_periods(),
            hourly_periods: default_hourly_periods(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherGuardConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHERGUARD_HTTP__TIMEOUT_SECONDS=30 and friends
        builder = builder.add_source(
            Environment::with_prefix("WEATHERGUARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherGuardConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherguard").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.http.user_agent.trim().is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_timeout();
        }
        if self.endpoints.geocoding_base_url.is_empty() {
            self.endpoints.geocoding_base_url = default_geocoding_base_url();
        }
        if self.endpoints.nws_base_url.is_empty() {
            self.endpoints.nws_base_url = default_nws_base_url();
        }
        if self.display.forecast_periods == 0 {
            self.display.forecast_periods = default_forecast_periods();
        }
        if self.display.hourly_periods == 0 {
            self.display.hourly_periods = default_hourly_periods();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_geolocation()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(
                WeatherGuardError::config("HTTP timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.display.forecast_periods > 56 {
            return Err(
                WeatherGuardError::config("Forecast periods cannot exceed 56").into(),
            );
        }

        if self.display.hourly_periods > 156 {
            return Err(
                WeatherGuardError::config("Hourly periods cannot exceed 156").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherGuardError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherGuardError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.endpoints.geocoding_base_url),
            ("NWS", &self.endpoints.nws_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherGuardError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.http.user_agent.trim().is_empty() {
            return Err(WeatherGuardError::config("User agent cannot be empty").into());
        }

        Ok(())
    }

    /// A fixed position needs both coordinates, in range
    fn validate_geolocation(&self) -> Result<()> {
        match (self.geolocation.latitude, self.geolocation.longitude) {
            (None, None) => Ok(()),
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(WeatherGuardError::config(format!(
                        "Geolocation fix out of range: {lat}, {lon}"
                    ))
                    .into());
                }
                Ok(())
            }
            _ => Err(WeatherGuardError::config(
                "Geolocation needs both latitude and longitude",
            )
            .into()),
        }
    }
}
