//! Free-text place search.
//!
//! Lookups are best effort: every failure is logged and reported as "no match".

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::foundation::core::LngLat;
use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::services::rate_limit::RateGate;
use crate::stops::{StopList, StopPatch};

pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const AUTOCOMPLETE_LIMIT: usize = 5;
/// Shorter queries are not worth a request.
pub const AUTOCOMPLETE_MIN_CHARS: usize = 2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One place matching a query.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GeocodeCandidate {
    pub label: String,
    pub coord: LngLat,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Up to `limit` candidates, best first. Empty on any failure.
    async fn search(&self, query: &str, limit: usize) -> Vec<GeocodeCandidate>;

    /// Best single match.
    async fn geocode(&self, query: &str) -> Option<GeocodeCandidate> {
        self.search(query, 1).await.into_iter().next()
    }

    /// Suggestions while typing.
    async fn autocomplete(&self, query: &str) -> Vec<GeocodeCandidate> {
        if query.trim().chars().count() < AUTOCOMPLETE_MIN_CHARS {
            return Vec::new();
        }
        self.search(query, AUTOCOMPLETE_LIMIT).await
    }
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    display_name: String,
}

/// Nominatim `/search` client.
#[derive(Clone, Debug)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    gate: Arc<RateGate>,
}

impl NominatimGeocoder {
    /// Client for `base_url` sharing the process-wide rate gate.
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> RoutecastResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RoutecastError::service(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            gate: RateGate::shared(),
        })
    }

    /// Use a private gate instead of the shared one.
    pub fn with_rate_gate(mut self, gate: Arc<RateGate>) -> Self {
        self.gate = gate;
        self
    }

    async fn fetch(&self, query: &str, limit: usize) -> anyhow::Result<Vec<GeocodeCandidate>> {
        let url = format!("{}/search", self.base_url);
        let limit = limit.to_string();
        let resp = self
            .gate
            .wait_then_call(|| {
                self.client
                    .get(&url)
                    .query(&[("q", query), ("format", "json"), ("limit", limit.as_str())])
                    .send()
            })
            .await
            .with_context(|| format!("geocoding request failed: {url}"))?
            .error_for_status()
            .context("geocoding request returned error")?;
        let hits: Vec<NominatimHit> = resp.json().await.context("invalid geocoding response")?;
        hits.into_iter().map(candidate_from_hit).collect()
    }
}

fn candidate_from_hit(hit: NominatimHit) -> anyhow::Result<GeocodeCandidate> {
    let lon: f64 = hit
        .lon
        .trim()
        .parse()
        .with_context(|| format!("bad longitude {:?}", hit.lon))?;
    let lat: f64 = hit
        .lat
        .trim()
        .parse()
        .with_context(|| format!("bad latitude {:?}", hit.lat))?;
    let coord = LngLat::new(lon, lat);
    anyhow::ensure!(coord.is_valid(), "coordinate out of range: {coord:?}");
    Ok(GeocodeCandidate {
        label: hit.display_name,
        coord,
    })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Vec<GeocodeCandidate> {
        match self.fetch(query, limit).await {
            Ok(found) => {
                debug!(query, count = found.len(), "geocoded");
                found
            }
            Err(e) => {
                warn!(query, error = %format!("{e:#}"), "geocoding failed");
                Vec::new()
            }
        }
    }
}

/// Resolve every named stop that has no coordinate yet, one request at a time.
///
/// Returns how many stops gained a coordinate.
pub async fn resolve_stops(geocoder: &dyn Geocoder, stops: &mut StopList) -> usize {
    let pending: Vec<_> = stops
        .stops()
        .iter()
        .filter(|s| s.coord.is_none() && !s.name.trim().is_empty())
        .map(|s| (s.id, s.name.clone()))
        .collect();

    let mut resolved = 0;
    for (id, name) in pending {
        stops.update(
            id,
            StopPatch {
                is_geocoding: Some(true),
                ..StopPatch::default()
            },
        );
        let found = geocoder.geocode(&name).await;
        if found.is_some() {
            resolved += 1;
        }
        stops.update(
            id,
            StopPatch {
                coord: Some(found.map(|c| c.coord)),
                is_geocoding: Some(false),
                ..StopPatch::default()
            },
        );
    }
    resolved
}

#[cfg(test)]
#[path = "../../tests/unit/services/geocode.rs"]
mod tests;
