use crate::foundation::math::normalize_signed_degrees;

/// Move `previous` a `factor` fraction of the shortest turn toward `target`.
pub fn smooth_bearing(previous: f64, target: f64, factor: f64) -> f64 {
    previous + normalize_signed_degrees(target - previous) * factor
}

/// Exponential heading filter fed once per sampled frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationSmoother {
    current: f64,
    factor: f64,
}

impl RotationSmoother {
    /// Heading starts due north; each update covers `factor` of the remaining turn.
    pub fn new(factor: f64) -> Self {
        Self {
            current: 0.0,
            factor,
        }
    }

    /// Feed a target bearing; `None` holds the current heading.
    pub fn update(&mut self, target: Option<f64>) -> f64 {
        if let Some(t) = target {
            self.current = smooth_bearing(self.current, t, self.factor);
        }
        self.current
    }

    /// Heading applied by the latest update, in degrees.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Back to north, used when a run restarts.
    pub fn reset(&mut self) {
        self.current = 0.0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/vehicle/rotation.rs"]
mod tests;
