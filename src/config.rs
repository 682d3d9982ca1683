//! Tunables of the animation engine and the JSON trip file read by the CLI.

use std::path::{Path as FsPath, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::capture::{CaptureConfig, DEFAULT_FILE_PREFIX};
use crate::foundation::core::{Canvas, LngLat};
use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::map::CameraSchedule;
use crate::path::clock::DurationPolicy;
use crate::services::geocode::NOMINATIM_BASE_URL;
use crate::services::routing::OSRM_BASE_URL;
use crate::stops::StopList;
use crate::vehicle::VehicleKind;

pub const SPEED_RANGE: (f64, f64) = (0.5, 5.0);
pub const VEHICLE_SIZE_RANGE: (f64, f64) = (0.5, 2.0);

/// Engine constants. The defaults reproduce the reference look and timing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationOpts {
    pub duration: DurationPolicy,
    pub camera: CameraSchedule,
    pub capture: CaptureConfig,
    /// Delay between starting a recording and starting the sampler.
    pub settle_delay: Duration,
    /// Bearing look-ahead of the sampler, as a fraction of path length.
    pub sampler_look_ahead: f64,
    /// Share of the angular difference applied per vehicle rotation update.
    pub rotation_smoothing: f64,
    /// Vehicle surface edge length at size 1.0.
    pub vehicle_base_px: u32,
}

impl Default for AnimationOpts {
    fn default() -> Self {
        Self {
            duration: DurationPolicy::default(),
            camera: CameraSchedule::default(),
            capture: CaptureConfig::default(),
            settle_delay: Duration::from_millis(200),
            sampler_look_ahead: 0.01,
            rotation_smoothing: 0.1,
            vehicle_base_px: 64,
        }
    }
}

impl AnimationOpts {
    pub fn validate(&self) -> RoutecastResult<()> {
        self.duration.validate()?;
        if !(0.0..=1.0).contains(&self.sampler_look_ahead)
            || !(0.0..=1.0).contains(&self.camera.look_ahead_fraction)
        {
            return Err(RoutecastError::validation(
                "look-ahead fractions must be within [0, 1]",
            ));
        }
        if !(self.rotation_smoothing > 0.0 && self.rotation_smoothing <= 1.0) {
            return Err(RoutecastError::validation(
                "rotation smoothing must be within (0, 1]",
            ));
        }
        if self.capture.fps.num == 0 || self.capture.fps.den == 0 {
            return Err(RoutecastError::validation("capture fps must be > 0"));
        }
        if self.vehicle_base_px == 0 {
            return Err(RoutecastError::validation("vehicle base size must be > 0"));
        }
        Ok(())
    }
}

/// One stop of a trip file: a place name, optionally already resolved.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StopEntry {
    pub name: String,
    #[serde(default)]
    pub coord: Option<LngLat>,
}

/// A trip as described in a JSON file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TripConfig {
    pub stops: Vec<StopEntry>,
    pub vehicle: VehicleKind,
    pub speed: f64,
    pub vehicle_size: f64,
    pub canvas: Canvas,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub routing_url: String,
    pub geocoding_url: String,
    pub user_agent: String,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            stops: Vec::new(),
            vehicle: VehicleKind::default(),
            speed: 1.0,
            vehicle_size: 1.0,
            canvas: Canvas::default(),
            output_dir: PathBuf::from("."),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            routing_url: OSRM_BASE_URL.to_string(),
            geocoding_url: NOMINATIM_BASE_URL.to_string(),
            user_agent: concat!("routecast/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TripConfig {
    /// Parse and validate a trip.
    pub fn from_json_str(s: &str) -> RoutecastResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a trip file.
    pub fn load(path: &FsPath) -> RoutecastResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read trip file '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Enforce the bounds of the user-facing controls.
    pub fn validate(&self) -> RoutecastResult<()> {
        if !in_range(self.speed, SPEED_RANGE) {
            return Err(RoutecastError::validation(format!(
                "speed must be within {}..={}",
                SPEED_RANGE.0, SPEED_RANGE.1
            )));
        }
        if !in_range(self.vehicle_size, VEHICLE_SIZE_RANGE) {
            return Err(RoutecastError::validation(format!(
                "vehicle size must be within {}..={}",
                VEHICLE_SIZE_RANGE.0, VEHICLE_SIZE_RANGE.1
            )));
        }
        self.canvas.validate()?;
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            return Err(RoutecastError::validation(
                "canvas width/height must be even",
            ));
        }
        if self.file_prefix.trim().is_empty() {
            return Err(RoutecastError::validation("file prefix must not be empty"));
        }
        if let Some(bad) = self
            .stops
            .iter()
            .filter_map(|s| s.coord)
            .find(|c| !c.is_valid())
        {
            return Err(RoutecastError::validation(format!(
                "stop coordinate out of range: [{}, {}]",
                bad.lon, bad.lat
            )));
        }
        Ok(())
    }

    /// Editable stops, padded to the two-stop minimum.
    pub fn stop_list(&self) -> StopList {
        StopList::from_entries(self.stops.iter().map(|s| (s.name.clone(), s.coord)))
    }
}

pub(crate) fn in_range(v: f64, (lo, hi): (f64, f64)) -> bool {
    v.is_finite() && v >= lo && v <= hi
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
