use std::time::Duration;

use crate::foundation::error::{RoutecastError, RoutecastResult};

pub use kurbo::Point;

/// Geographic coordinate in degrees, serialized as a GeoJSON `[lon, lat]` pair.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl LngLat {
    /// Create a coordinate from longitude and latitude.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Return `true` when both components are finite and latitude is within `[-90, 90]`.
    pub fn is_valid(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat)
    }

    pub(crate) fn to_geo(self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }

    pub(crate) fn from_geo(p: geo::Point<f64>) -> Self {
        Self::new(p.x(), p.y())
    }

    /// Linear interpolation in degree space.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            self.lon + (other.lon - self.lon) * t,
            self.lat + (other.lat - self.lat) * t,
        )
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(c: LngLat) -> Self {
        [c.lon, c.lat]
    }
}

/// Axis-aligned geographic extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LngLatBounds {
    /// South-west corner.
    pub min: LngLat,
    /// North-east corner.
    pub max: LngLat,
}

impl LngLatBounds {
    /// Smallest extent containing every coordinate, or `None` for an empty iterator.
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a LngLat>) -> Option<Self> {
        let mut it = coords.into_iter();
        let first = *it.next()?;
        let mut b = Self {
            min: first,
            max: first,
        };
        for c in it {
            b.min.lon = b.min.lon.min(c.lon);
            b.min.lat = b.min.lat.min(c.lat);
            b.max.lon = b.max.lon.max(c.lon);
            b.max.lat = b.max.lat.max(c.lat);
        }
        Some(b)
    }

    /// Midpoint in degree space.
    pub fn center(self) -> LngLat {
        self.min.lerp(self.max, 0.5)
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Reject empty canvases and sizes the rasterizer cannot address.
    pub fn validate(self) -> RoutecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RoutecastError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(RoutecastError::validation(
                "canvas width/height must fit in u16",
            ));
        }
        Ok(())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> RoutecastResult<Self> {
        if den == 0 {
            return Err(RoutecastError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(RoutecastError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame.
    pub fn frame_duration(self) -> Duration {
        Duration::from_secs_f64(f64::from(self.den) / f64::from(self.num))
    }

    /// Convert a frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

/// Straight-alpha RGB color parsed from `0xRRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb8 {
    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Format as `#rrggbb` for SVG markup.
    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
