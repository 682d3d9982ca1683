//! The base map drawable and the animator that drives it.

pub mod animator;
pub mod badges;
pub mod surface;
pub mod view;

pub use animator::{CameraSchedule, CameraTrailAnimator, trail_len};
pub use surface::{MapStyle, MapSurface, RouteLayers};
pub use view::{CameraPose, MapView};
