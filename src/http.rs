//! Shared HTTP plumbing for the upstream clients
//!
//! One GET-and-decode path with request timing. Nothing here retries: a
//! failed request is reported and the caller decides what to do.

use crate::config::HttpConfig;
use crate::error::SourceError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Responses slower than this are logged as a warning
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Build a client carrying the identifying user agent and request timeout
pub fn build_client(http: &HttpConfig) -> Result<Client, SourceError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(http.timeout_seconds.into()))
        .user_agent(http.user_agent.clone())
        .build()?;
    Ok(client)
}

/// GET `url` and decode the JSON body into `T`
#[instrument(skip(client), level = "debug")]
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, SourceError> {
    let start_time = Instant::now();
    debug!("HTTP GET {}", url);

    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/geo+json, application/json")
        .send()
        .await
        .inspect_err(|e| warn!("Network error after {:.3}s: {}", start_time.elapsed().as_secs_f64(), e))?;

    let status = response.status();
    if !status.is_success() {
        warn!("HTTP {} from {}", status, url);
        return Err(SourceError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    let parse_start = Instant::now();
    let value = serde_json::from_str(&body)
        .map_err(|e| SourceError::parse(format!("{url}: {e}")))?;

    let total_duration = start_time.elapsed();
    info!(
        "GET {} in {:.3}s (parse: {:.3}s)",
        url,
        total_duration.as_secs_f64(),
        parse_start.elapsed().as_secs_f64()
    );
    if total_duration > SLOW_RESPONSE {
        warn!("Slow API response detected: {:.3}s", total_duration.as_secs_f64());
    }

    Ok(value)
}

/// Join a base URL and a path without doubling the slash
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
