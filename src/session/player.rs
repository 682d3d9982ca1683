use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::foundation::error::RoutecastResult;
use crate::session::session::{AnimationSession, SessionEvent};

pub const DISPLAY_HZ: u32 = 60;

/// Source of display-refresh timestamps, strictly increasing.
#[async_trait]
pub trait DisplayClock: Send {
    async fn next_frame(&mut self) -> Duration;
}

/// Wall-clock refresh driven by a Tokio interval. Create it inside a runtime.
#[derive(Debug)]
pub struct RealtimeDisplay {
    interval: Interval,
    origin: Instant,
    offset: Duration,
}

impl RealtimeDisplay {
    /// Frames at `hz`, timestamps starting at `offset`.
    pub fn new(hz: u32, offset: Duration) -> Self {
        let period = Duration::from_nanos(1_000_000_000 / u64::from(hz.max(1)));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            origin: Instant::now(),
            offset,
        }
    }
}

#[async_trait]
impl DisplayClock for RealtimeDisplay {
    async fn next_frame(&mut self) -> Duration {
        let at = self.interval.tick().await;
        self.offset + at.saturating_duration_since(self.origin)
    }
}

/// Virtual refresh that never sleeps, for offline export and tests.
#[derive(Clone, Copy, Debug)]
pub struct SteppedDisplay {
    hz: u32,
    start: Duration,
    frame: u64,
}

impl SteppedDisplay {
    /// Virtual clock ticking at `hz` from `start`, without waiting.
    pub fn new(hz: u32, start: Duration) -> Self {
        Self {
            hz: hz.max(1),
            start,
            frame: 0,
        }
    }
}

#[async_trait]
impl DisplayClock for SteppedDisplay {
    async fn next_frame(&mut self) -> Duration {
        let at = self.start + Duration::from_nanos(self.frame * 1_000_000_000 / u64::from(self.hz));
        self.frame += 1;
        at
    }
}

/// Summary of one [`Player::run_until_idle`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerOutcome {
    pub frames: u64,
    pub completed: bool,
    /// Display time at which playback reached the end.
    pub finished_at: Option<Duration>,
    pub exported: Option<PathBuf>,
    pub capture_error: Option<String>,
}

/// Drives a session from a display clock.
#[derive(Debug)]
pub struct Player<C> {
    clock: C,
}

impl<C: DisplayClock> Player<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Advance `session` once per display frame until it has nothing left to do or
    /// `max_frames` frames have passed. Completed exports are finalized before returning.
    pub async fn run_until_idle(
        &mut self,
        session: &mut AnimationSession,
        max_frames: u64,
    ) -> RoutecastResult<PlayerOutcome> {
        let mut out = PlayerOutcome::default();
        while out.frames < max_frames && session.has_pending_work() {
            let now = self.clock.next_frame().await;
            out.frames += 1;
            for event in session.advance(now)? {
                match event {
                    SessionEvent::Progress(_) => {}
                    SessionEvent::Completed => {
                        out.completed = true;
                        out.finished_at = Some(now);
                    }
                    SessionEvent::ExportReady => {
                        out.completed = true;
                        out.finished_at = Some(now);
                        out.exported = session.finish_export().await;
                    }
                    SessionEvent::CaptureFailed(reason) => out.capture_error = Some(reason),
                }
            }
        }
        tracing::debug!(frames = out.frames, completed = out.completed, "player idle");
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/player.rs"]
mod tests;
