use std::sync::Arc;
use std::time::Duration;

use crate::foundation::core::LngLat;
use crate::foundation::math::unit_progress;
use crate::path::clock::AnimationClock;
use crate::path::geometry::{Path, initial_bearing};
use crate::schedule::{FrameHandle, FrameScheduler};

/// Past this progress there is no meaningful forward point, so bearing is held.
pub const BEARING_HOLD_PROGRESS: f64 = 0.999;

/// Position and heading at one progress value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampledPosition {
    /// Interpolated coordinate.
    pub coordinate: LngLat,
    /// Bearing toward the look-ahead point; `None` when the previous bearing should be held.
    pub bearing_deg: Option<f64>,
    /// Distance travelled along the path.
    pub distance_km: f64,
    /// Progress the sample was taken at.
    pub progress: f64,
}

/// Sample `path` at `progress`, looking `look_ahead_fraction` of the path length ahead for bearing.
pub fn sample(path: &Path, progress: f64, look_ahead_fraction: f64) -> SampledPosition {
    let progress = unit_progress(progress);
    let length = path.length_km();
    let distance_km = length * progress;
    let coordinate = path.point_at_fraction(progress);

    let ahead_km = (distance_km + length * look_ahead_fraction).min(length);
    let bearing_deg = if progress < BEARING_HOLD_PROGRESS && ahead_km - distance_km > 1e-9 {
        Some(initial_bearing(coordinate, path.point_at_distance(ahead_km)))
    } else {
        None
    };

    SampledPosition {
        coordinate,
        bearing_deg,
        distance_km,
        progress,
    }
}

/// Result of one sampler frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerTick {
    /// Point, bearing and progress at the tick's display time.
    pub position: SampledPosition,
    /// Set on the single frame that reached progress 1.
    pub completed: bool,
}

#[derive(Debug)]
struct SamplerRun {
    path: Arc<Path>,
    clock: AnimationClock,
}

/// Frame-driven walker over a [`Path`].
///
/// Holds at most one pending frame at a time. A tick whose handle is not the pending one is
/// ignored, so callbacks that survive a stop or restart cannot advance the run.
#[derive(Debug)]
pub struct PathSampler {
    look_ahead_fraction: f64,
    run: Option<SamplerRun>,
    pending: Option<FrameHandle>,
}

impl PathSampler {
    /// Idle sampler; bearings look `look_ahead_fraction` of the path length ahead.
    pub fn new(look_ahead_fraction: f64) -> Self {
        Self {
            look_ahead_fraction,
            run: None,
            pending: None,
        }
    }

    /// Begin a fresh run over `path`, cancelling any run in flight.
    pub fn start<T>(
        &mut self,
        scheduler: &mut FrameScheduler<T>,
        task: T,
        path: Arc<Path>,
        total: Duration,
    ) {
        self.stop(scheduler);
        let mut clock = AnimationClock::new(total);
        clock.start();
        tracing::debug!(
            length_km = path.length_km(),
            total_secs = total.as_secs_f64(),
            "sampler run started"
        );
        self.run = Some(SamplerRun { path, clock });
        self.pending = Some(scheduler.request_frame(task));
    }

    /// Advance the run for the frame identified by `handle` at display time `now`.
    ///
    /// Re-registers `task` for the next frame unless the run completed on this tick.
    pub fn tick<T>(
        &mut self,
        scheduler: &mut FrameScheduler<T>,
        handle: FrameHandle,
        now: Duration,
        task: T,
    ) -> Option<SamplerTick> {
        if self.pending != Some(handle) {
            return None;
        }
        self.pending = None;
        let run = self.run.as_mut()?;

        let progress = run.clock.tick(now);
        let position = sample(&run.path, progress, self.look_ahead_fraction);
        let completed = progress >= 1.0;
        if completed {
            run.clock.stop();
            tracing::debug!(elapsed_secs = run.clock.elapsed().as_secs_f64(), "sampler run completed");
        } else {
            self.pending = Some(scheduler.request_frame(task));
        }
        Some(SamplerTick {
            position,
            completed,
        })
    }

    /// Cancel the pending frame. Returns `true` if one was cancelled; repeated calls are no-ops.
    pub fn stop<T>(&mut self, scheduler: &mut FrameScheduler<T>) -> bool {
        if let Some(run) = self.run.as_mut() {
            run.clock.stop();
        }
        match self.pending.take() {
            Some(handle) => scheduler.cancel(handle),
            None => false,
        }
    }

    /// Drop the run entirely so progress reads as zero.
    pub fn reset<T>(&mut self, scheduler: &mut FrameScheduler<T>) {
        self.stop(scheduler);
        self.run = None;
    }

    /// Whether a frame is pending.
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Progress of the current (or last) run.
    pub fn progress(&self) -> f64 {
        self.run.as_ref().map_or(0.0, |r| r.clock.progress())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/path/sampler.rs"]
mod tests;
