use std::time::Duration;

use crate::foundation::core::Fps;

/// Fixed-rate sampling of a live surface.
///
/// A frame is due at the stream start and at every `1/fps` boundary after it. When the caller
/// polls less often than the stream rate, the missed boundaries are reported together so the
/// encoded duration keeps up with wall time.
#[derive(Clone, Copy, Debug)]
pub struct CaptureStream {
    fps: Fps,
    started_at: Duration,
    emitted: u64,
}

impl CaptureStream {
    /// Stream whose first frame is due at `started_at`.
    pub fn new(fps: Fps, started_at: Duration) -> Self {
        Self {
            fps,
            started_at,
            emitted: 0,
        }
    }

    /// Number of frames that became due since the previous poll, counting them as emitted.
    pub fn frames_due(&mut self, now: Duration) -> u64 {
        let Some(elapsed) = now.checked_sub(self.started_at) else {
            return 0;
        };
        let boundaries = elapsed.as_nanos() * u128::from(self.fps.num)
            / (u128::from(self.fps.den) * 1_000_000_000);
        let target = u64::try_from(boundaries).unwrap_or(u64::MAX).saturating_add(1);
        let due = target.saturating_sub(self.emitted);
        self.emitted = self.emitted.max(target);
        due
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    /// Frames reported due so far.
    pub fn frames_emitted(&self) -> u64 {
        self.emitted
    }

    /// Media time covered by the emitted frames.
    pub fn media_duration(&self) -> Duration {
        Duration::from_secs_f64(self.fps.frames_to_secs(self.emitted))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/stream.rs"]
mod tests;
