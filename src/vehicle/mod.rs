//! The vehicle drawable: palettes, meshes, heading smoothing and the software renderer.

pub mod kind;
pub mod mesh;
pub mod rotation;
pub mod surface;

pub use kind::{VehicleKind, vehicle_pixel_size};
pub use rotation::{RotationSmoother, smooth_bearing};
pub use surface::VehicleSurface;
