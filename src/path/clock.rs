use std::time::Duration;

use crate::foundation::error::{RoutecastError, RoutecastResult};

/// Converts path length and speed into a run duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DurationPolicy {
    /// Lower clamp on the base duration.
    pub min: Duration,
    /// Upper clamp on the base duration.
    pub max: Duration,
    /// Kilometres covered per second of base duration.
    pub reference_rate_km_per_s: f64,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(8),
            max: Duration::from_secs(30),
            reference_rate_km_per_s: 500.0,
        }
    }
}

impl DurationPolicy {
    /// Validate bounds and rate.
    pub fn validate(&self) -> RoutecastResult<()> {
        if self.min.is_zero() || self.min > self.max {
            return Err(RoutecastError::validation(
                "duration bounds must satisfy 0 < min <= max",
            ));
        }
        if !(self.reference_rate_km_per_s.is_finite() && self.reference_rate_km_per_s > 0.0) {
            return Err(RoutecastError::validation(
                "reference rate must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// `clamp(length / rate, min, max) / speed`.
    pub fn total_duration(&self, path_length_km: f64, speed: f64) -> Duration {
        let base = (path_length_km.max(0.0) / self.reference_rate_km_per_s)
            .clamp(self.min.as_secs_f64(), self.max.as_secs_f64());
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            1.0
        };
        Duration::from_secs_f64(base / speed)
    }
}

/// Time-driven progress clock for one run.
///
/// The run starts on the first tick (like a frame callback's first timestamp). Progress never
/// decreases within a run; only [`AnimationClock::reset`] zeroes it.
#[derive(Clone, Debug)]
pub struct AnimationClock {
    elapsed: Duration,
    total: Duration,
    running: bool,
    started_at: Option<Duration>,
}

impl AnimationClock {
    /// Create a stopped clock for a run lasting `total`.
    pub fn new(total: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            total,
            running: false,
            started_at: None,
        }
    }

    /// Mark the clock running; the start instant is taken from the next tick.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop advancing. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Zero elapsed time and forget the start instant.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.started_at = None;
        self.running = false;
    }

    /// Advance to display time `now` and return the new progress.
    pub fn tick(&mut self, now: Duration) -> f64 {
        if self.running {
            let start = *self.started_at.get_or_insert(now);
            let elapsed = now.saturating_sub(start);
            self.elapsed = self.elapsed.max(elapsed);
        }
        self.progress()
    }

    /// `elapsed / total`, clamped to `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Elapsed run time.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total run time.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Whether the clock is advancing.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
#[path = "../../tests/unit/path/clock.rs"]
mod tests;
