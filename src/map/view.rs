use std::f64::consts::PI;

use crate::foundation::core::{Canvas, LngLat, LngLatBounds, Point};

/// World size in pixels at zoom 0.
pub const TILE_SIZE: f64 = 512.0;
/// Latitude limit of the Web Mercator square.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

const MIN_ZOOM: f64 = 0.0;
const MAX_ZOOM: f64 = 22.0;
const MAX_PITCH: f64 = 60.0;
/// Camera distance in screen heights.
const CAMERA_ALTITUDE: f64 = 1.5;
/// Points nearer than this fraction of the camera distance are treated as behind the camera.
const NEAR_PLANE: f64 = 0.05;

/// Camera parameters applied to the map in one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub center: LngLat,
    pub zoom: f64,
    /// Tilt away from straight-down, degrees.
    pub pitch_deg: f64,
    /// Map rotation, degrees clockwise from north.
    pub bearing_deg: f64,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            center: LngLat::new(0.0, 0.0),
            zoom: 1.0,
            pitch_deg: 0.0,
            bearing_deg: 0.0,
        }
    }
}

/// Web Mercator world pixel coordinates of `c` at zoom 0.
pub fn mercator(c: LngLat) -> (f64, f64) {
    let lat = c.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (c.lon + 180.0) / 360.0 * TILE_SIZE;
    let y = (1.0 - (PI / 4.0 + lat / 2.0).tan().ln() / PI) / 2.0 * TILE_SIZE;
    (x, y)
}

/// Inverse of [`mercator`].
pub fn inverse_mercator(x: f64, y: f64) -> LngLat {
    let lon = x / TILE_SIZE * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / TILE_SIZE);
    let lat = n.sinh().atan().to_degrees();
    LngLat::new(lon, lat)
}

/// The visible map viewport: a canvas plus a camera pose.
#[derive(Clone, Debug)]
pub struct MapView {
    canvas: Canvas,
    pose: CameraPose,
}

impl MapView {
    /// World view at the default pose.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            pose: CameraPose::default(),
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Apply `pose` immediately, clamping zoom and pitch to the supported range.
    pub fn jump_to(&mut self, pose: CameraPose) {
        self.pose = CameraPose {
            center: pose.center,
            zoom: pose.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pitch_deg: pose.pitch_deg.clamp(0.0, MAX_PITCH),
            bearing_deg: pose.bearing_deg,
        };
    }

    fn scale(&self) -> f64 {
        2f64.powf(self.pose.zoom)
    }

    /// Project a coordinate to canvas pixels, or `None` when it lies behind the camera.
    pub fn project(&self, c: LngLat) -> Option<Point> {
        if !(c.lon.is_finite() && c.lat.is_finite()) {
            return None;
        }
        let scale = self.scale();
        let (cx, cy) = mercator(self.pose.center);
        let (px, py) = mercator(c);
        let (dx, dy) = ((px - cx) * scale, (py - cy) * scale);

        let b = self.pose.bearing_deg.to_radians();
        let rx = dx * b.cos() + dy * b.sin();
        let ry = -dx * b.sin() + dy * b.cos();

        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let dist = CAMERA_ALTITUDE * h;
        let p = self.pose.pitch_deg.to_radians();
        let depth = dist - ry * p.sin();
        if depth <= dist * NEAR_PLANE {
            return None;
        }
        Some(Point::new(
            w / 2.0 + dist * rx / depth,
            h / 2.0 + dist * ry * p.cos() / depth,
        ))
    }

    /// Center on `bounds` and pick the largest zoom that fits it inside `padding`.
    pub fn fit_bounds(&mut self, bounds: LngLatBounds, padding: f64, pitch_deg: f64) {
        let (x0, y1) = mercator(bounds.min);
        let (x1, y0) = mercator(bounds.max);
        let span_x = (x1 - x0).abs().max(1e-9);
        let span_y = (y1 - y0).abs().max(1e-9);

        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let avail_w = if w > 2.0 * padding { w - 2.0 * padding } else { w };
        let avail_h = if h > 2.0 * padding { h - 2.0 * padding } else { h };
        let zoom = (avail_w / span_x).min(avail_h / span_y).log2();

        let center = inverse_mercator((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        self.jump_to(CameraPose {
            center,
            zoom,
            pitch_deg,
            bearing_deg: 0.0,
        });
        tracing::debug!(zoom = self.pose.zoom, "fit map to bounds");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/map/view.rs"]
mod tests;
