use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::foundation::core::LngLat;
use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::path::geometry::Path;
use crate::path::great_circle::great_circle_path;
use crate::stops::StopList;
use crate::vehicle::VehicleKind;

pub const OSRM_BASE_URL: &str = "https://router.project-osrm.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Computes the travelled path through resolved stops.
///
/// Implementations never fail: with at least two coordinates they always return a path,
/// degrading to the great-circle fallback; with fewer they return `None`.
#[async_trait]
pub trait PathSource: Send + Sync {
    async fn route(&self, coords: &[LngLat], vehicle: VehicleKind) -> Option<Path>;
}

/// Offline great-circle arcs between consecutive stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreatCircleSource;

#[async_trait]
impl PathSource for GreatCircleSource {
    async fn route(&self, coords: &[LngLat], _vehicle: VehicleKind) -> Option<Path> {
        fallback(coords)
    }
}

fn fallback(coords: &[LngLat]) -> Option<Path> {
    if coords.len() < 2 {
        return None;
    }
    match great_circle_path(coords) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(error = %e, "great-circle fallback failed");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<LngLat>,
}

/// Road routing through an OSRM server for cars and trains; arcs for everything else.
#[derive(Clone, Debug)]
pub struct OsrmPathSource {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmPathSource {
    /// OSRM client for `base_url`, identifying itself with `user_agent`.
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> RoutecastResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RoutecastError::service(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, coords: &[LngLat]) -> anyhow::Result<Path> {
        let waypoints = coords
            .iter()
            .map(|c| format!("{},{}", c.lon, c.lat))
            .collect::<Vec<_>>()
            .join(";");
        // Trains have no rail profile on public OSRM; they follow roads too.
        let url = format!("{}/route/v1/driving/{waypoints}", self.base_url);
        let body: OsrmResponse = self
            .client
            .get(&url)
            .query(&[("geometries", "geojson"), ("overview", "full")])
            .send()
            .await
            .with_context(|| format!("routing request failed: {url}"))?
            .json()
            .await
            .context("invalid routing response")?;
        anyhow::ensure!(body.code == "Ok", "routing returned code {:?}", body.code);
        let geometry = body
            .routes
            .into_iter()
            .next()
            .map(|r| r.geometry.coordinates)
            .context("routing response has no route")?;
        anyhow::ensure!(
            geometry.len() >= 2,
            "route geometry has {} coordinates",
            geometry.len()
        );
        Ok(Path::new(geometry)?)
    }
}

#[async_trait]
impl PathSource for OsrmPathSource {
    async fn route(&self, coords: &[LngLat], vehicle: VehicleKind) -> Option<Path> {
        if coords.len() < 2 {
            return None;
        }
        if !vehicle.follows_roads() {
            return fallback(coords);
        }
        match self.fetch(coords).await {
            Ok(path) => {
                debug!(vertices = path.vertex_count(), km = path.length_km(), "road route");
                Some(path)
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "routing unavailable, using great-circle path");
                fallback(coords)
            }
        }
    }
}

/// Holds the current path and recomputes it only when the resolved stops or the vehicle change.
#[derive(Clone, Debug, Default)]
pub struct RouteTracker {
    key: Option<(String, VehicleKind)>,
    path: Option<Path>,
    computed: u64,
}

impl RouteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path for the stops seen by the latest [`RouteTracker::refresh`].
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Take the tracked path.
    pub fn into_path(self) -> Option<Path> {
        self.path
    }

    /// How many times the source was asked for a path.
    pub fn computed(&self) -> u64 {
        self.computed
    }

    /// Bring the path up to date with `stops`. Returns `true` when it was recomputed.
    pub async fn refresh(
        &mut self,
        source: &dyn PathSource,
        stops: &StopList,
        vehicle: VehicleKind,
    ) -> bool {
        let key = (stops.coord_key(), vehicle);
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.path = source.route(&stops.resolved_coords(), vehicle).await;
        self.computed += 1;
        self.key = Some(key);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/routing.rs"]
mod tests;
