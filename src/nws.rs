//! National Weather Service API client
//!
//! [`WeatherApi`] names the six upstream resources a query needs. Each is a
//! single GET; sequencing and failure policy live in
//! [`crate::weather_source`]. [`NwsClient`] maps the GeoJSON responses of
//! api.weather.gov onto the crate's models.

use crate::config::WeatherGuardConfig;
use crate::error::SourceError;
use crate::http::{build_client, get_json, join_url};
use crate::models::{Alert, AlertGeometry, ForecastPeriod, GridReference, Location, Observation};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Upstream weather resources
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Grid cell and resource links for a point
    async fn grid(&self, location: &Location) -> Result<GridReference, SourceError>;

    /// Day/night forecast periods from the grid's forecast link
    async fn forecast(&self, url: &str) -> Result<Vec<ForecastPeriod>, SourceError>;

    /// Hourly forecast periods from the grid's hourly link
    async fn hourly(&self, url: &str) -> Result<Vec<ForecastPeriod>, SourceError>;

    /// Alerts currently active at a point
    async fn alerts(&self, location: &Location) -> Result<Vec<Alert>, SourceError>;

    /// Station identifiers near the grid, nearest first
    async fn stations(&self, url: &str) -> Result<Vec<String>, SourceError>;

    /// Most recent observation from a station
    async fn latest_observation(&self, station_id: &str) -> Result<Observation, SourceError>;
}

/// HTTP client for api.weather.gov
#[derive(Debug, Clone)]
pub struct NwsClient {
    client: Client,
    base_url: String,
}

impl NwsClient {
    pub fn new(config: &WeatherGuardConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(&config.http)?,
            base_url: config.endpoints.nws_base_url.clone(),
        })
    }

    fn points_url(&self, location: &Location) -> String {
        join_url(&self.base_url, &format!("points/{}", location.grid_key()))
    }

    fn alerts_url(&self, location: &Location) -> String {
        join_url(
            &self.base_url,
            &format!("alerts/active?point={}", location.grid_key()),
        )
    }

    fn observation_url(&self, station_id: &str) -> String {
        join_url(
            &self.base_url,
            &format!(
                "stations/{}/observations/latest",
                urlencoding::encode(station_id)
            ),
        )
    }

    async fn periods(&self, url: &str) -> Result<Vec<ForecastPeriod>, SourceError> {
        let response: wire::ForecastResponse = get_json(&self.client, url).await?;
        Ok(response.properties.periods)
    }
}

#[async_trait]
impl WeatherApi for NwsClient {
    #[instrument(skip(self), fields(point = %location.grid_key()))]
    async fn grid(&self, location: &Location) -> Result<GridReference, SourceError> {
        let response: wire::PointsResponse =
            get_json(&self.client, &self.points_url(location)).await?;
        let grid = GridReference::try_from(response.properties)?;
        debug!(
            "Grid {:?} {:?},{:?} for {}",
            grid.office,
            grid.grid_x,
            grid.grid_y,
            location.name()
        );
        Ok(grid)
    }

    #[instrument(skip(self))]
    async fn forecast(&self, url: &str) -> Result<Vec<ForecastPeriod>, SourceError> {
        let periods = self.periods(url).await?;
        info!("Retrieved forecast with {} periods", periods.len());
        Ok(periods)
    }

    #[instrument(skip(self))]
    async fn hourly(&self, url: &str) -> Result<Vec<ForecastPeriod>, SourceError> {
        let periods = self.periods(url).await?;
        info!("Retrieved hourly forecast with {} periods", periods.len());
        Ok(periods)
    }

    #[instrument(skip(self), fields(point = %location.grid_key()))]
    async fn alerts(&self, location: &Location) -> Result<Vec<Alert>, SourceError> {
        let response: wire::AlertCollection =
            get_json(&self.client, &self.alerts_url(location)).await?;
        let alerts: Vec<Alert> = response
            .features
            .into_iter()
            .filter_map(wire::AlertFeature::into_alert)
            .collect();
        info!("{} active alerts", alerts.len());
        Ok(alerts)
    }

    #[instrument(skip(self))]
    async fn stations(&self, url: &str) -> Result<Vec<String>, SourceError> {
        let response: wire::StationCollection = get_json(&self.client, url).await?;
        Ok(response
            .features
            .into_iter()
            .filter_map(|feature| feature.properties.station_identifier)
            .collect())
    }

    #[instrument(skip(self))]
    async fn latest_observation(&self, station_id: &str) -> Result<Observation, SourceError> {
        let response: wire::ObservationResponse =
            get_json(&self.client, &self.observation_url(station_id)).await?;
        let mut observation = Observation::from(response.properties);
        observation.station_id = Some(station_id.to_string());
        Ok(observation)
    }
}

/// api.weather.gov response shapes
mod wire {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PointsResponse {
        pub properties: PointProperties,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PointProperties {
        pub grid_id: Option<String>,
        pub grid_x: Option<i64>,
        pub grid_y: Option<i64>,
        pub forecast: Option<String>,
        pub forecast_hourly: Option<String>,
        pub observation_stations: Option<String>,
    }

    impl TryFrom<PointProperties> for GridReference {
        type Error = SourceError;

        fn try_from(point: PointProperties) -> Result<Self, Self::Error> {
            Ok(Self {
                office: point.grid_id,
                grid_x: point.grid_x,
                grid_y: point.grid_y,
                forecast_url: point
                    .forecast
                    .ok_or(SourceError::MissingField("properties.forecast"))?,
                forecast_hourly_url: point
                    .forecast_hourly
                    .ok_or(SourceError::MissingField("properties.forecastHourly"))?,
                observation_stations_url: point
                    .observation_stations
                    .ok_or(SourceError::MissingField("properties.observationStations"))?,
            })
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub properties: ForecastProperties,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastProperties {
        #[serde(default)]
        pub periods: Vec<ForecastPeriod>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AlertCollection {
        #[serde(default)]
        pub features: Vec<AlertFeature>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AlertFeature {
        /// Kept loose: anything other than a (Multi)Polygon is dropped
        #[serde(default)]
        pub geometry: serde_json::Value,
        pub properties: AlertProperties,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AlertProperties {
        pub id: Option<String>,
        #[serde(default)]
        pub event: String,
        pub severity: Option<String>,
        pub headline: Option<String>,
        pub description: Option<String>,
        pub instruction: Option<String>,
        pub area_desc: Option<String>,
        pub sent: Option<DateTime<FixedOffset>>,
        pub effective: Option<DateTime<FixedOffset>>,
        pub ends: Option<DateTime<FixedOffset>>,
        pub expires: Option<DateTime<FixedOffset>>,
        pub urgency: Option<String>,
    }

    impl AlertFeature {
        pub fn into_alert(self) -> Option<Alert> {
            let props = self.properties;
            let Some(effective) = props.effective.or(props.sent) else {
                warn!("Dropping alert {:?} without an effective time", props.event);
                return None;
            };
            let geometry = serde_json::from_value::<AlertGeometry>(self.geometry).ok();

            Some(Alert {
                id: props.id,
                event: props.event,
                severity: props.severity.into(),
                headline: props.headline,
                description: props.description.unwrap_or_default(),
                instruction: props.instruction,
                area_desc: props.area_desc,
                effective,
                ends: props.ends.or(props.expires),
                urgency: props.urgency,
                geometry,
            })
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct StationCollection {
        #[serde(default)]
        pub features: Vec<StationFeature>,
    }

    #[derive(Debug, Deserialize)]
    pub struct StationFeature {
        pub properties: StationProperties,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StationProperties {
        pub station_identifier: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ObservationResponse {
        pub properties: ObservationProperties,
    }

    /// A WMO-coded measurement; `value` is null when the sensor has nothing
    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QuantitativeValue {
        pub value: Option<f64>,
        #[serde(default)]
        pub unit_code: String,
    }

    impl QuantitativeValue {
        fn unit(&self) -> &str {
            self.unit_code
                .rsplit(':')
                .next()
                .unwrap_or(&self.unit_code)
        }

        pub fn celsius(&self) -> Option<f64> {
            let value = self.value?;
            match self.unit() {
                "degF" => Some(crate::units::fahrenheit_to_celsius(value)),
                "K" => Some(value - 273.15),
                _ => Some(value),
            }
        }

        pub fn meters_per_second(&self) -> Option<f64> {
            let value = self.value?;
            match self.unit() {
                "km_h-1" => Some(value / 3.6),
                "[mi_i]_h-1" => Some(value / 2.237),
                "[kn_i]" => Some(value * 0.514_444),
                _ => Some(value),
            }
        }

        pub fn raw(&self) -> Option<f64> {
            self.value
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ObservationProperties {
        pub timestamp: Option<DateTime<FixedOffset>>,
        #[serde(default)]
        pub text_description: Option<String>,
        #[serde(default)]
        pub temperature: QuantitativeValue,
        #[serde(default)]
        pub wind_chill: QuantitativeValue,
        #[serde(default)]
        pub heat_index: QuantitativeValue,
        #[serde(default)]
        pub relative_humidity: QuantitativeValue,
        #[serde(default)]
        pub wind_speed: QuantitativeValue,
        #[serde(default)]
        pub wind_direction: QuantitativeValue,
        #[serde(default)]
        pub barometric_pressure: QuantitativeValue,
        #[serde(default)]
        pub visibility: QuantitativeValue,
    }

    impl From<ObservationProperties> for Observation {
        fn from(props: ObservationProperties) -> Self {
            Self {
                station_id: None,
                timestamp: props.timestamp,
                temperature_c: props.temperature.celsius(),
                wind_chill_c: props.wind_chill.celsius(),
                heat_index_c: props.heat_index.celsius(),
                humidity_pct: props.relative_humidity.raw(),
                wind_speed_mps: props.wind_speed.meters_per_second(),
                wind_direction_deg: props.wind_direction.raw(),
                pressure_pa: props.barometric_pressure.raw(),
                visibility_m: props.visibility.raw(),
                text_description: props.text_description.unwrap_or_default(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::wire::*;
    use super::*;

    #[test]
    fn test_urls_use_four_decimal_point() {
        let mut config = WeatherGuardConfig::default();
        config.endpoints.nws_base_url = "https://nws.example/".to_string();
        let client = NwsClient::new(&config).unwrap();
        let miami = Location::new(25.774_26, -80.193_66, "Miami, FL").unwrap();

        assert_eq!(client.points_url(&miami), "https://nws.example/points/25.7743,-80.1937");
        assert_eq!(
            client.alerts_url(&miami),
            "https://nws.example/alerts/active?point=25.7743,-80.1937"
        );
        assert_eq!(
            client.observation_url("KMIA"),
            "https://nws.example/stations/KMIA/observations/latest"
        );
    }

    #[test]
    fn test_points_missing_forecast_link() {
        let json = r#"{"properties":{"gridId":"MFL","gridX":110,"gridY":50,"forecast":null,
            "forecastHourly":"https://x/hourly","observationStations":"https://x/stations"}}"#;
        let response: PointsResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            GridReference::try_from(response.properties),
            Err(SourceError::MissingField("properties.forecast"))
        ));
    }

    #[test]
    fn test_observation_units_normalised() {
        let json = r#"{"properties":{
            "timestamp":"2026-10-18T13:53:00+00:00",
            "textDescription":"Mostly Cloudy",
            "temperature":{"unitCode":"wmoUnit:degC","value":28.3},
            "windChill":{"unitCode":"wmoUnit:degC","value":null},
            "heatIndex":{"unitCode":"wmoUnit:degC","value":31.2},
            "relativeHumidity":{"unitCode":"wmoUnit:percent","value":70.4},
            "windSpeed":{"unitCode":"wmoUnit:km_h-1","value":18.0},
            "windDirection":{"unitCode":"wmoUnit:degree_(angle)","value":90},
            "barometricPressure":{"unitCode":"wmoUnit:Pa","value":101390},
            "visibility":{"unitCode":"wmoUnit:m","value":16090}
        }}"#;
        let response: ObservationResponse = serde_json::from_str(json).unwrap();
        let observation = Observation::from(response.properties);

        assert_eq!(observation.temperature_c, Some(28.3));
        assert_eq!(observation.wind_chill_c, None);
        assert_eq!(observation.feels_like_c(), Some(31.2));
        assert!((observation.wind_speed_mps.unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(observation.pressure_pa, Some(101_390.0));
        assert_eq!(observation.text_description, "Mostly Cloudy");
    }

    #[test]
    fn test_observation_with_missing_sensors() {
        let json = r#"{"properties":{"timestamp":null,"textDescription":null,
            "temperature":{"unitCode":"wmoUnit:degC","value":null}}}"#;
        let response: ObservationResponse = serde_json::from_str(json).unwrap();
        let observation = Observation::from(response.properties);
        assert_eq!(observation, Observation::default());
    }

    #[test]
    fn test_alert_feature_conversion() {
        let json = r#"{"features":[
            {"geometry":null,"properties":{"id":"urn:oid:1","event":"Hurricane Warning",
             "severity":"Extreme","headline":"Hurricane Warning issued","description":"Dangerous storm",
             "instruction":null,"areaDesc":"Miami-Dade","effective":"2026-10-18T10:00:00-04:00",
             "ends":null,"expires":"2026-10-19T10:00:00-04:00","urgency":"Immediate"}},
            {"geometry":{"type":"Polygon","coordinates":[[[-80.1,25.7],[-80.2,25.8],[-80.1,25.7]]]},
             "properties":{"event":"Rip Current Statement","severity":null,
             "description":null,"effective":"2026-10-18T06:00:00-04:00"}},
            {"geometry":{"type":"GeometryCollection","geometries":[]},
             "properties":{"event":"Test Message","sent":"2026-10-18T06:00:00-04:00"}},
            {"geometry":null,"properties":{"event":"No Time"}}
        ]}"#;
        let collection: AlertCollection = serde_json::from_str(json).unwrap();
        let alerts: Vec<Alert> = collection
            .features
            .into_iter()
            .filter_map(AlertFeature::into_alert)
            .collect();

        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].severity, crate::models::Severity::Extreme);
        assert!(alerts[0].ends.is_some());
        assert_eq!(alerts[1].severity, crate::models::Severity::Unspecified);
        assert_eq!(alerts[1].description, "");
        assert!(matches!(alerts[1].geometry, Some(AlertGeometry::Polygon(_))));
        assert!(alerts[2].geometry.is_none());
    }

    #[test]
    fn test_station_identifiers_in_order() {
        let json = r#"{"features":[
            {"properties":{"stationIdentifier":"KMIA"}},
            {"properties":{"stationIdentifier":"KTMB"}}
        ]}"#;
        let collection: StationCollection = serde_json::from_str(json).unwrap();
        let ids: Vec<String> = collection
            .features
            .into_iter()
            .filter_map(|f| f.properties.station_identifier)
            .collect();
        assert_eq!(ids, vec!["KMIA", "KTMB"]);
    }
}
