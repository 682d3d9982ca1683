use crate::config::{SPEED_RANGE, VEHICLE_SIZE_RANGE, in_range};
use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::vehicle::VehicleKind;

/// User-facing animation configuration plus derived progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub progress: f64,
    pub speed: f64,
    pub vehicle: VehicleKind,
    pub vehicle_size: f64,
    pub is_playing: bool,
    pub is_recording: bool,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            progress: 0.0,
            speed: 1.0,
            vehicle: VehicleKind::Plane,
            vehicle_size: 1.0,
            is_playing: false,
            is_recording: false,
        }
    }
}

impl AnimationState {
    /// Accept a speed multiplier inside [`SPEED_RANGE`].
    pub fn validate_speed(speed: f64) -> RoutecastResult<f64> {
        if in_range(speed, SPEED_RANGE) {
            Ok(speed)
        } else {
            Err(RoutecastError::validation(format!(
                "speed {speed} outside {}..={}",
                SPEED_RANGE.0, SPEED_RANGE.1
            )))
        }
    }

    /// Accept a vehicle scale inside [`VEHICLE_SIZE_RANGE`].
    pub fn validate_vehicle_size(size: f64) -> RoutecastResult<f64> {
        if in_range(size, VEHICLE_SIZE_RANGE) {
            Ok(size)
        } else {
            Err(RoutecastError::validation(format!(
                "vehicle size {size} outside {}..={}",
                VEHICLE_SIZE_RANGE.0, VEHICLE_SIZE_RANGE.1
            )))
        }
    }
}
