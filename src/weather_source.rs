//! Weather data aggregation for one location
//!
//! The grid lookup comes first because every other resource hangs off it.
//! Forecast, hourly, alerts and the station branch then run concurrently.
//! The station branch chains the nearest station's latest observation and
//! never fails the whole fetch.

use crate::error::SourceError;
use crate::models::{Alert, ForecastPeriod, GridReference, Location, ObservationOutcome};
use crate::nws::WeatherApi;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Raw results of one fetch, before triage
#[derive(Debug, Clone)]
pub struct WeatherBundle {
    pub grid: GridReference,
    pub forecast: Vec<ForecastPeriod>,
    pub hourly: Vec<ForecastPeriod>,
    pub alerts: Vec<Alert>,
    pub current: ObservationOutcome,
}

#[derive(Clone)]
pub struct WeatherSourceClient {
    api: Arc<dyn WeatherApi>,
}

impl WeatherSourceClient {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self { api }
    }

    /// Fetch everything a snapshot needs.
    ///
    /// Fails if the grid, forecast, hourly or alerts request fails. A
    /// missing or failed observation is reported in `current` instead.
    #[instrument(skip(self), fields(location = %location.name()))]
    pub async fn fetch(&self, location: &Location) -> Result<WeatherBundle, SourceError> {
        let start_time = Instant::now();
        let grid = self.api.grid(location).await?;

        let (forecast, hourly, alerts, current) = tokio::join!(
            self.api.forecast(&grid.forecast_url),
            self.api.hourly(&grid.forecast_hourly_url),
            self.api.alerts(location),
            self.current_conditions(&grid.observation_stations_url),
        );

        let bundle = WeatherBundle {
            forecast: forecast?,
            hourly: hourly?,
            alerts: alerts?,
            current,
            grid,
        };

        info!(
            "Fetched {} forecast, {} hourly periods and {} alerts in {:.3}s",
            bundle.forecast.len(),
            bundle.hourly.len(),
            bundle.alerts.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(bundle)
    }

    /// Nearest station's latest observation; every failure is absorbed
    async fn current_conditions(&self, stations_url: &str) -> ObservationOutcome {
        let stations = match self.api.stations(stations_url).await {
            Ok(stations) => stations,
            Err(e) => {
                warn!("Station list unavailable: {}", e);
                return ObservationOutcome::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        let Some(nearest) = stations.first() else {
            info!("No observation stations for this grid");
            return ObservationOutcome::NoStation;
        };

        match self.api.latest_observation(nearest).await {
            Ok(observation) => ObservationOutcome::Reported { observation },
            Err(e) => {
                let e = SourceError::ObservationUnavailable(format!("{nearest}: {e}"));
                warn!("{}", e);
                ObservationOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeApi {
        fail_grid: bool,
        fail_hourly: bool,
        fail_alerts: bool,
        fail_stations: bool,
        fail_observation: bool,
        stations: Vec<String>,
        delay: Duration,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeApi {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn failure() -> SourceError {
        SourceError::Status {
            status: 500,
            url: "fake".to_string(),
        }
    }

    fn period(name: &str) -> ForecastPeriod {
        ForecastPeriod {
            name: name.to_string(),
            start_time: DateTime::parse_from_rfc3339("2026-10-18T18:00:00-04:00").unwrap(),
            temperature: 80,
            temperature_unit: "F".to_string(),
            is_daytime: false,
            short_forecast: "Partly Cloudy".to_string(),
            wind_speed: "5 mph".to_string(),
            wind_direction: "E".to_string(),
        }
    }

    #[async_trait]
    impl WeatherApi for FakeApi {
        async fn grid(&self, _location: &Location) -> Result<GridReference, SourceError> {
            self.record("grid");
            if self.fail_grid {
                return Err(failure());
            }
            Ok(GridReference {
                office: Some("MFL".to_string()),
                grid_x: Some(110),
                grid_y: Some(50),
                forecast_url: "forecast".to_string(),
                forecast_hourly_url: "hourly".to_string(),
                observation_stations_url: "stations".to_string(),
            })
        }

        async fn forecast(&self, url: &str) -> Result<Vec<ForecastPeriod>, SourceError> {
            assert_eq!(url, "forecast");
            tokio::time::sleep(self.delay).await;
            self.record("forecast");
            Ok(vec![period("Tonight"), period("Sunday")])
        }

        async fn hourly(&self, url: &str) -> Result<Vec<ForecastPeriod>, SourceError> {
            assert_eq!(url, "hourly");
            tokio::time::sleep(self.delay).await;
            self.record("hourly");
            if self.fail_hourly {
                return Err(failure());
            }
            Ok(vec![period("")])
        }

        async fn alerts(&self, _location: &Location) -> Result<Vec<Alert>, SourceError> {
            tokio::time::sleep(self.delay).await;
            self.record("alerts");
            if self.fail_alerts {
                return Err(failure());
            }
            Ok(Vec::new())
        }

        async fn stations(&self, url: &str) -> Result<Vec<String>, SourceError> {
            assert_eq!(url, "stations");
            tokio::time::sleep(self.delay).await;
            self.record("stations");
            if self.fail_stations {
                return Err(failure());
            }
            Ok(self.stations.clone())
        }

        async fn latest_observation(&self, station_id: &str) -> Result<Observation, SourceError> {
            self.record("observation");
            if self.fail_observation {
                return Err(failure());
            }
            Ok(Observation {
                station_id: Some(station_id.to_string()),
                temperature_c: Some(27.0),
                ..Default::default()
            })
        }
    }

    fn miami() -> Location {
        Location::new(25.7617, -80.1918, "Miami, FL").unwrap()
    }

    async fn fetch(api: FakeApi) -> (Result<WeatherBundle, SourceError>, Vec<&'static str>) {
        let api = Arc::new(api);
        let result = WeatherSourceClient::new(api.clone()).fetch(&miami()).await;
        (result, api.calls())
    }

    #[tokio::test]
    async fn test_observation_from_nearest_station() {
        let (result, calls) = fetch(FakeApi {
            stations: vec!["KMIA".to_string(), "KTMB".to_string()],
            ..Default::default()
        })
        .await;
        let bundle = result.unwrap();

        assert_eq!(calls.first(), Some(&"grid"));
        assert_eq!(calls.last(), Some(&"observation"));
        assert_eq!(bundle.forecast.len(), 2);
        assert_eq!(
            bundle.current.observation().unwrap().station_id.as_deref(),
            Some("KMIA")
        );
    }

    #[tokio::test]
    async fn test_grid_failure_is_fatal_and_stops_fan_out() {
        let (result, calls) = fetch(FakeApi {
            fail_grid: true,
            ..Default::default()
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, vec!["grid"]);
    }

    #[tokio::test]
    async fn test_hourly_failure_is_fatal() {
        let (result, calls) = fetch(FakeApi {
            fail_hourly: true,
            stations: vec!["KMIA".to_string()],
            ..Default::default()
        })
        .await;
        assert!(matches!(result, Err(SourceError::Status { status: 500, .. })));
        assert!(calls.contains(&"forecast"));
        assert!(calls.contains(&"alerts"));
    }

    #[tokio::test]
    async fn test_alerts_failure_is_fatal() {
        let (result, _) = fetch(FakeApi {
            fail_alerts: true,
            stations: vec!["KMIA".to_string()],
            ..Default::default()
        })
        .await;
        assert!(matches!(result, Err(SourceError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_empty_station_list() {
        let (result, calls) = fetch(FakeApi::default()).await;
        assert_eq!(result.unwrap().current, ObservationOutcome::NoStation);
        assert!(!calls.contains(&"observation"));
    }

    #[tokio::test]
    async fn test_station_failures_are_absorbed() {
        let (result, _) = fetch(FakeApi {
            fail_stations: true,
            ..Default::default()
        })
        .await;
        let bundle = result.unwrap();
        assert!(matches!(bundle.current, ObservationOutcome::Unavailable { .. }));
        assert!(bundle.alerts.is_empty());

        let (result, _) = fetch(FakeApi {
            stations: vec!["KMIA".to_string()],
            fail_observation: true,
            ..Default::default()
        })
        .await;
        match result.unwrap().current {
            ObservationOutcome::Unavailable { reason } => assert!(reason.contains("KMIA")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dependent_fetches_run_concurrently() {
        let started = tokio::time::Instant::now();
        let (result, _) = fetch(FakeApi {
            delay: Duration::from_secs(2),
            stations: vec!["KMIA".to_string()],
            ..Default::default()
        })
        .await;
        assert!(result.is_ok());
        // four branches of 2s each, overlapped
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
