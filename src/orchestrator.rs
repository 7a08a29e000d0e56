//! Query orchestration
//!
//! Runs resolve, fetch, triage and snapshot for one request, and publishes
//! progress through a [`watch`] channel. Every request gets a fresh
//! [`QueryId`]; a result is committed only while its id is still the
//! current one, so a slow earlier query can never overwrite a newer one.

use crate::WeatherGuardError;
use crate::config::WeatherGuardConfig;
use crate::error::SourceError;
use crate::geocode::NominatimClient;
use crate::geolocation::{self, GeolocationError, GeolocationProvider};
use crate::location_resolver::{LocationInput, LocationResolver};
use crate::models::{Location, WeatherSnapshot};
use crate::nws::NwsClient;
use crate::triage::triage;
use crate::weather_source::WeatherSourceClient;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Monotonically increasing query identity; 0 is the idle session
pub type QueryId = u64;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Resolving,
    Fetching,
    Ready(Arc<WeatherSnapshot>),
    Error(WeatherGuardError),
}

/// The one active query context
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub query: QueryId,
    pub state: QueryState,
}

/// What the user asked for; kept so it can be retried
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRequest {
    Text(String),
    Coordinates(f64, f64),
    Geolocation,
}

impl fmt::Display for QueryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Coordinates(lat, lon) => write!(f, "{lat}, {lon}"),
            Self::Geolocation => f.write_str("current location"),
        }
    }
}

/// How a query ended, from the caller's point of view
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Ready(Arc<WeatherSnapshot>),
    Failed(WeatherGuardError),
    /// A newer query started first; nothing was committed
    Superseded,
}

pub struct Orchestrator {
    resolver: LocationResolver,
    source: WeatherSourceClient,
    geolocation: Arc<dyn GeolocationProvider>,
    session: watch::Sender<Session>,
    last_request: Mutex<Option<QueryRequest>>,
}

impl Orchestrator {
    pub fn new(
        resolver: LocationResolver,
        source: WeatherSourceClient,
        geolocation: Arc<dyn GeolocationProvider>,
    ) -> Self {
        let (session, _) = watch::channel(Session::default());
        Self {
            resolver,
            source,
            geolocation,
            session,
            last_request: Mutex::new(None),
        }
    }

    /// Wire up the HTTP clients and geolocation source named in `config`
    pub fn from_config(config: &WeatherGuardConfig) -> Result<Self, SourceError> {
        let geocoder = Arc::new(NominatimClient::new(config)?);
        let api = Arc::new(NwsClient::new(config)?);
        Ok(Self::new(
            LocationResolver::new(geocoder),
            WeatherSourceClient::new(api),
            Arc::from(geolocation::from_config(&config.geolocation)),
        ))
    }

    /// Watch every committed state change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Look up free text; `lat,lon` text resolves as coordinates
    pub async fn search(&self, text: &str) -> QueryOutcome {
        self.run(QueryRequest::Text(text.to_string())).await
    }

    pub async fn search_coordinates(&self, latitude: f64, longitude: f64) -> QueryOutcome {
        self.run(QueryRequest::Coordinates(latitude, longitude)).await
    }

    /// Look up wherever the geolocation provider says we are
    pub async fn locate(&self) -> QueryOutcome {
        self.run(QueryRequest::Geolocation).await
    }

    /// Re-run the last request from scratch; `None` if there was none
    pub async fn retry(&self) -> Option<QueryOutcome> {
        let request = self.last_request()?;
        info!("Retrying {}", request);
        Some(self.run(request).await)
    }

    fn last_request(&self) -> Option<QueryRequest> {
        match self.last_request.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn remember(&self, request: &QueryRequest) {
        let mut guard = match self.last_request.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(request.clone());
    }

    #[instrument(skip(self), fields(query = tracing::field::Empty))]
    async fn run(&self, request: QueryRequest) -> QueryOutcome {
        self.remember(&request);
        let id = self.begin();
        tracing::Span::current().record("query", id);
        info!("Query {} started for {}", id, request);

        let result = self.execute(id, &request).await;
        let (state, outcome) = match result {
            Ok(Some(snapshot)) => {
                let snapshot = Arc::new(snapshot);
                (
                    QueryState::Ready(snapshot.clone()),
                    QueryOutcome::Ready(snapshot),
                )
            }
            Ok(None) => return self.superseded(id),
            Err(e) => {
                warn!("Query {} failed: {}", id, e);
                (QueryState::Error(e.clone()), QueryOutcome::Failed(e))
            }
        };

        if self.commit(id, state) {
            outcome
        } else {
            self.superseded(id)
        }
    }

    /// Resolve then fetch. `Ok(None)` means a newer query took over while
    /// resolving and the fetch was skipped.
    async fn execute(
        &self,
        id: QueryId,
        request: &QueryRequest,
    ) -> crate::Result<Option<WeatherSnapshot>> {
        let location = self.resolve(request).await?;

        if !self.commit(id, QueryState::Fetching) {
            return Ok(None);
        }

        let bundle = self.source.fetch(&location).await.map_err(|e| {
            warn!("Weather fetch for {} failed: {}", location.name(), e);
            WeatherGuardError::weather_unavailable(e.to_string())
        })?;

        let triaged = triage(bundle.alerts);
        debug!(
            "Triage: {} alerts, banner {:?}",
            triaged.sorted.len(),
            triaged.banner.as_ref().map(|a| a.event.as_str())
        );

        Ok(Some(WeatherSnapshot::new(
            location,
            bundle.grid,
            bundle.forecast,
            bundle.hourly,
            triaged,
            bundle.current,
        )))
    }

    async fn resolve(&self, request: &QueryRequest) -> crate::Result<Location> {
        match request {
            QueryRequest::Text(text) => self.resolver.resolve(LocationInput::parse(text)?).await,
            QueryRequest::Coordinates(lat, lon) => {
                self.resolver.resolve(LocationInput::Coordinates(*lat, *lon)).await
            }
            QueryRequest::Geolocation => {
                let fix = self
                    .geolocation
                    .current_position()
                    .await
                    .map_err(|e| match e {
                        GeolocationError::Unsupported => WeatherGuardError::GeolocationUnsupported,
                        GeolocationError::Denied => {
                            warn!("Geolocation failed: {}", e);
                            WeatherGuardError::GeolocationDenied
                        }
                    })?;
                self.resolver
                    .resolve(LocationInput::Coordinates(fix.latitude, fix.longitude))
                    .await
            }
        }
    }

    /// Start a new query: bump the id and enter `Resolving`
    fn begin(&self) -> QueryId {
        let mut id = 0;
        self.session.send_modify(|session| {
            session.query += 1;
            session.state = QueryState::Resolving;
            id = session.query;
        });
        id
    }

    /// Write `state` only if `id` is still the current query
    fn commit(&self, id: QueryId, state: QueryState) -> bool {
        self.session.send_if_modified(|session| {
            if session.query == id {
                session.state = state;
                true
            } else {
                false
            }
        })
    }

    fn superseded(&self, id: QueryId) -> QueryOutcome {
        warn!(
            "Discarding result of query {}; query {} is current",
            id,
            self.session.borrow().query
        );
        QueryOutcome::Superseded
    }
}
