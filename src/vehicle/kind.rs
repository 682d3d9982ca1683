use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Rgb8;
use crate::foundation::error::RoutecastError;

/// Which vehicle travels the route.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    #[default]
    Plane,
    Car,
    Train,
    Ship,
}

/// Three-tone colour scheme of a vehicle mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub primary: Rgb8,
    pub secondary: Rgb8,
    pub accent: Rgb8,
}

/// Wheel colour shared by every wheeled vehicle.
pub const WHEEL_COLOR: Rgb8 = Rgb8::from_hex(0x1F2937);

impl VehicleKind {
    pub const ALL: [VehicleKind; 4] = [Self::Plane, Self::Car, Self::Train, Self::Ship];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plane => "plane",
            Self::Car => "car",
            Self::Train => "train",
            Self::Ship => "ship",
        }
    }

    /// Primary, secondary and accent colours.
    pub fn palette(self) -> Palette {
        let (p, s, a) = match self {
            Self::Plane => (0x3B82F6, 0x1E40AF, 0xFCD34D),
            Self::Car => (0xEF4444, 0x991B1B, 0xF97316),
            Self::Train => (0x10B981, 0x065F46, 0xFBBF24),
            Self::Ship => (0x8B5CF6, 0x5B21B6, 0x60A5FA),
        };
        Palette {
            primary: Rgb8::from_hex(p),
            secondary: Rgb8::from_hex(s),
            accent: Rgb8::from_hex(a),
        }
    }

    /// Whether routes for this vehicle follow the road network rather than a great circle.
    pub fn follows_roads(self) -> bool {
        matches!(self, Self::Car | Self::Train)
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleKind {
    type Err = RoutecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RoutecastError::validation(format!("unknown vehicle kind '{s}'")))
    }
}

/// Pixel edge of the vehicle drawable for a size multiplier.
pub fn vehicle_pixel_size(base_px: u32, size_multiplier: f64) -> u32 {
    ((f64::from(base_px) * size_multiplier).round() as u32).max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/vehicle/kind.rs"]
mod tests;
