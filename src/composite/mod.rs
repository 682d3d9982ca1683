//! Merges the map drawable and the vehicle drawable into the recorded surface.

use crate::foundation::core::Point;
use crate::foundation::error::RoutecastResult;
use crate::render::{FrameRGBA, blit_over};
use crate::schedule::{FrameHandle, FrameScheduler};

/// Top-left corner that centres an overlay of `width`x`height` on `anchor`.
pub fn overlay_origin(anchor: Point, width: u32, height: u32) -> (i64, i64) {
    (
        (anchor.x - f64::from(width) / 2.0).round() as i64,
        (anchor.y - f64::from(height) / 2.0).round() as i64,
    )
}

/// Clear `out` to the size of `base`, copy `base`, then centre `overlay` on `anchor`.
///
/// The overlay is skipped when either it or the anchor is missing.
pub fn compose_into(
    out: &mut FrameRGBA,
    base: &FrameRGBA,
    overlay: Option<&FrameRGBA>,
    anchor: Option<Point>,
) {
    out.width = base.width;
    out.height = base.height;
    out.premultiplied = base.premultiplied;
    out.data.clear();
    out.data.extend_from_slice(&base.data);

    if let (Some(overlay), Some(anchor)) = (overlay, anchor) {
        let (x, y) = overlay_origin(anchor, overlay.width, overlay.height);
        blit_over(out, overlay, x, y);
    }
}

/// One merged frame.
pub fn compose(base: &FrameRGBA, overlay: Option<&FrameRGBA>, anchor: Option<Point>) -> FrameRGBA {
    let mut out = FrameRGBA {
        width: 0,
        height: 0,
        data: Vec::with_capacity(base.data.len()),
        premultiplied: true,
    };
    compose_into(&mut out, base, overlay, anchor);
    out
}

/// Per-frame compositing loop, independent of playback.
///
/// Keeps a single pending frame registered while running. Stop cancels it; a tick carrying any
/// other handle is ignored.
#[derive(Debug, Default)]
pub struct FrameCompositor {
    pending: Option<FrameHandle>,
    output: Option<FrameRGBA>,
    frames: u64,
}

impl FrameCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin compositing on the next frame. Returns `false` if already running.
    pub fn start<T>(&mut self, scheduler: &mut FrameScheduler<T>, task: T) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(scheduler.request_frame(task));
        tracing::debug!("compositor started");
        true
    }

    /// Compose one frame for `handle` and re-register `task`.
    pub fn tick<T>(
        &mut self,
        scheduler: &mut FrameScheduler<T>,
        handle: FrameHandle,
        task: T,
        base: &FrameRGBA,
        overlay: Option<&FrameRGBA>,
        anchor: Option<Point>,
    ) -> RoutecastResult<Option<&FrameRGBA>> {
        if self.pending != Some(handle) {
            return Ok(None);
        }
        if self.output.is_none() {
            self.output = Some(FrameRGBA::new_transparent(base.width, base.height)?);
        }
        if let Some(out) = self.output.as_mut() {
            compose_into(out, base, overlay, anchor);
        }
        self.frames += 1;
        self.pending = Some(scheduler.request_frame(task));
        Ok(self.output.as_ref())
    }

    /// Cancel the pending frame. Returns `true` if the loop was running.
    pub fn stop<T>(&mut self, scheduler: &mut FrameScheduler<T>) -> bool {
        match self.pending.take() {
            Some(h) => {
                scheduler.cancel(h);
                tracing::debug!(frames = self.frames, "compositor stopped");
                true
            }
            None => false,
        }
    }

    /// Whether a composite frame is pending.
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Most recent composed frame.
    pub fn output(&self) -> Option<&FrameRGBA> {
        self.output.as_ref()
    }

    /// Frames composed since creation.
    pub fn frames_composed(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
