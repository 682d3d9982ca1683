use std::sync::Arc;

use crate::foundation::core::{Canvas, LngLat, LngLatBounds, Point};
use crate::foundation::error::RoutecastResult;
use crate::foundation::math::unit_progress;
use crate::map::surface::{MapStyle, MapSurface, RouteLayers};
use crate::map::view::{CameraPose, MapView};
use crate::path::geometry::{Path, initial_bearing};
use crate::path::sampler::{BEARING_HOLD_PROGRESS, SampledPosition};
use crate::render::FrameRGBA;

/// Camera follow schedule as a function of progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSchedule {
    pub zoom_start: f64,
    pub zoom_gain: f64,
    pub zoom_max: f64,
    pub pitch_start: f64,
    pub pitch_gain: f64,
    /// Fraction of the path bearing applied to the map bearing.
    pub bearing_damping: f64,
    /// Look-ahead distance for the camera bearing, as a fraction of path length.
    pub look_ahead_fraction: f64,
    /// Padding used when fitting the camera to the route.
    pub fit_padding: f64,
    /// Pitch used when fitting the camera to the route.
    pub fit_pitch: f64,
}

impl Default for CameraSchedule {
    fn default() -> Self {
        Self {
            zoom_start: 6.0,
            zoom_gain: 3.0,
            zoom_max: 10.0,
            pitch_start: 45.0,
            pitch_gain: 10.0,
            bearing_damping: 0.3,
            look_ahead_fraction: 0.05,
            fit_padding: 80.0,
            fit_pitch: 45.0,
        }
    }
}

impl CameraSchedule {
    /// Camera pose for one sampled position along `path`.
    pub fn pose_for(&self, path: &Path, position: &SampledPosition) -> CameraPose {
        let p = position.progress;
        let length = path.length_km();
        let ahead_km = (position.distance_km + length * self.look_ahead_fraction).min(length);
        let bearing_deg = if p < BEARING_HOLD_PROGRESS && ahead_km - position.distance_km > 1e-9 {
            initial_bearing(position.coordinate, path.point_at_distance(ahead_km))
                * self.bearing_damping
        } else {
            0.0
        };
        CameraPose {
            center: position.coordinate,
            zoom: (self.zoom_start + p * self.zoom_gain).min(self.zoom_max),
            pitch_deg: self.pitch_start + p * self.pitch_gain,
            bearing_deg,
        }
    }
}

/// Number of path vertices drawn as trail at `progress`.
pub fn trail_len(progress: f64, vertex_count: usize) -> usize {
    let p = unit_progress(progress);
    ((p * vertex_count as f64).ceil() as usize).min(vertex_count)
}

/// Sole owner and mutator of the map viewport and its route layers.
pub struct CameraTrailAnimator {
    view: MapView,
    surface: MapSurface,
    layers: RouteLayers,
    schedule: CameraSchedule,
    marker: Option<LngLat>,
}

impl CameraTrailAnimator {
    /// Animator over an empty map at the initial world view.
    pub fn new(canvas: Canvas, style: MapStyle, schedule: CameraSchedule) -> RoutecastResult<Self> {
        let mut view = MapView::new(canvas);
        view.jump_to(CameraPose {
            center: LngLat::new(20.0, 30.0),
            zoom: 2.0,
            pitch_deg: 40.0,
            bearing_deg: 0.0,
        });
        Ok(Self {
            view,
            surface: MapSurface::new(canvas, style)?,
            layers: RouteLayers::default(),
            schedule,
            marker: None,
        })
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn layers(&self) -> &RouteLayers {
        &self.layers
    }

    /// Last rendered base drawable.
    pub fn frame(&self) -> &FrameRGBA {
        self.surface.frame()
    }

    /// Redraw the base drawable from the current view and layers.
    pub fn render(&mut self) -> RoutecastResult<&FrameRGBA> {
        self.surface.render(&self.view, &self.layers)
    }

    /// Replace the route source, clearing the trail and fitting the camera to it.
    pub fn set_route(&mut self, route: Option<Arc<Path>>) -> RoutecastResult<()> {
        self.layers.trail.clear();
        if let Some(path) = &route {
            self.fit(path.bounds());
        }
        self.layers.route = route;
        self.render()?;
        Ok(())
    }

    /// Replace stop badges and frame them: fit two or more, center on a single one.
    pub fn set_stops(&mut self, stops: Vec<LngLat>) -> RoutecastResult<()> {
        match stops.as_slice() {
            [] => {}
            [only] => {
                let pose = self.view.pose();
                self.view.jump_to(CameraPose {
                    center: *only,
                    zoom: 8.0,
                    ..pose
                });
            }
            many => {
                if let Some(bounds) = LngLatBounds::from_coords(many) {
                    let pitch = self.view.pose().pitch_deg;
                    self.view
                        .fit_bounds(bounds, self.schedule.fit_padding, pitch);
                }
            }
        }
        self.layers.stops = stops;
        self.render()?;
        Ok(())
    }

    /// Apply one sampled position: trail prefix, camera pose, marker placement.
    ///
    /// The camera moves immediately; per-frame sampling already supplies the smoothing.
    pub fn apply(&mut self, position: &SampledPosition) -> RoutecastResult<()> {
        let Some(path) = self.layers.route.clone() else {
            return Ok(());
        };
        let n = trail_len(position.progress, path.vertex_count());
        self.layers.trail.clear();
        self.layers.trail.extend_from_slice(path.prefix(n));
        self.view.jump_to(self.schedule.pose_for(&path, position));
        self.marker = Some(position.coordinate);
        self.render()?;
        Ok(())
    }

    /// Put the vehicle marker at `coord` without moving the camera.
    pub fn place_marker(&mut self, coord: LngLat) {
        self.marker = Some(coord);
    }

    /// Remove the vehicle marker.
    pub fn remove_marker(&mut self) {
        self.marker = None;
    }

    /// Geographic position of the vehicle marker.
    pub fn marker(&self) -> Option<LngLat> {
        self.marker
    }

    /// Screen position of the vehicle marker, if placed and visible.
    pub fn marker_screen_position(&self) -> Option<Point> {
        self.marker.and_then(|c| self.view.project(c))
    }

    /// Clear trail and marker, then fit the camera to the whole route.
    pub fn reset(&mut self) -> RoutecastResult<()> {
        self.layers.trail.clear();
        self.marker = None;
        if let Some(path) = self.layers.route.clone() {
            self.fit(path.bounds());
        }
        self.render()?;
        tracing::debug!("map view reset");
        Ok(())
    }

    fn fit(&mut self, bounds: LngLatBounds) {
        self.view
            .fit_bounds(bounds, self.schedule.fit_padding, self.schedule.fit_pitch);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/map/animator.rs"]
mod tests;
