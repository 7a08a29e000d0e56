//! Forward and reverse geocoding
//!
//! [`Geocoder`] is the seam the resolver talks to; [`NominatimClient`] is the
//! HTTP implementation against a Nominatim-compatible service, restricted to
//! US results.

use crate::config::WeatherGuardConfig;
use crate::error::SourceError;
use crate::http::{build_client, get_json, join_url};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// One forward-geocoding match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Structured address parts used to label a coordinate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
}

/// Reverse-geocoding answer for a coordinate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReverseGeocode {
    #[serde(default)]
    pub address: Address,
    pub display_name: Option<String>,
}

/// Geocoding backend
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidates for a free-text query, best first. Empty means no match.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, SourceError>;

    /// Address for a coordinate
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<ReverseGeocode, SourceError>;
}

/// Nominatim search result; coordinates arrive as numeric strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

impl TryFrom<NominatimPlace> for GeocodeCandidate {
    type Error = SourceError;

    fn try_from(place: NominatimPlace) -> Result<Self, Self::Error> {
        let latitude = place
            .lat
            .trim()
            .parse()
            .map_err(|_| SourceError::parse(format!("latitude {:?}", place.lat)))?;
        let longitude = place
            .lon
            .trim()
            .parse()
            .map_err(|_| SourceError::parse(format!("longitude {:?}", place.lon)))?;
        Ok(Self {
            latitude,
            longitude,
            display_name: place.display_name,
        })
    }
}

/// Geocoder backed by a Nominatim-compatible HTTP service
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &WeatherGuardConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(&config.http)?,
            base_url: config.endpoints.geocoding_base_url.clone(),
        })
    }

    fn search_url(&self, query: &str) -> String {
        join_url(
            &self.base_url,
            &format!(
                "search?q={}&format=json&limit=1&countrycodes=us",
                urlencoding::encode(query)
            ),
        )
    }

    fn reverse_url(&self, latitude: f64, longitude: f64) -> String {
        join_url(
            &self.base_url,
            &format!("reverse?lat={latitude}&lon={longitude}&format=json"),
        )
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, SourceError> {
        info!("Geocoding location: '{}'", query);
        let places: Vec<NominatimPlace> = get_json(&self.client, &self.search_url(query)).await?;

        let candidates = places
            .into_iter()
            .map(GeocodeCandidate::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        if candidates.is_empty() {
            warn!("No results found for location '{}'", query);
        } else {
            debug!(
                "Geocoding results: {:?}",
                candidates
                    .iter()
                    .map(|c| format!("{} ({:.4}, {:.4})", c.display_name, c.latitude, c.longitude))
                    .collect::<Vec<_>>()
            );
        }
        Ok(candidates)
    }

    #[instrument(skip(self))]
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<ReverseGeocode, SourceError> {
        info!("Reverse geocoding {:.4}, {:.4}", latitude, longitude);
        get_json(&self.client, &self.reverse_url(latitude, longitude)).await
    }
}
