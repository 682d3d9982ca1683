use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::capture::{
    CaptureController, DEFAULT_FILE_PREFIX, DefaultEncoderFactory, EncoderFactory,
    deliver_download,
};
use crate::composite::{FrameCompositor, compose};
use crate::config::AnimationOpts;
use crate::foundation::core::{Canvas, LngLat};
use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::map::{CameraTrailAnimator, MapStyle};
use crate::path::geometry::Path;
use crate::path::sampler::{PathSampler, sample};
use crate::render::FrameRGBA;
use crate::schedule::{FrameHandle, FrameScheduler};
use crate::session::notify::{
    EXPORT_CANCELLED, EXPORT_SUCCESS, Notifier, TracingNotifier, recording_failed,
};
use crate::session::state::AnimationState;
use crate::vehicle::{RotationSmoother, VehicleKind, VehicleSurface, vehicle_pixel_size};

/// Work items registered with the session's frame scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionTask {
    Sample,
    Composite,
    Settle,
}

/// What happened during one [`AnimationSession::advance`].
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Progress(f64),
    /// Playback reached the end without a recording.
    Completed,
    /// Playback of an export reached the end; call [`AnimationSession::finish_export`].
    ExportReady,
    /// The running recording was dropped.
    CaptureFailed(String),
}

/// Where finished recordings are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportTarget {
    pub dir: PathBuf,
    pub prefix: String,
}

impl Default for ExportTarget {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

/// One animation session: the owner of every surface, loop and recording.
///
/// All frame-driven work runs from [`AnimationSession::advance`], called once per display
/// frame. Within a frame the sampler tick updates the camera and trail before the vehicle
/// heading; the compositor reads whatever both surfaces hold when its own tick comes up.
pub struct AnimationSession {
    opts: AnimationOpts,
    state: AnimationState,
    scheduler: FrameScheduler<SessionTask>,
    sampler: PathSampler,
    animator: CameraTrailAnimator,
    vehicle: Option<VehicleSurface>,
    rotation: RotationSmoother,
    compositor: FrameCompositor,
    capture: CaptureController,
    notifier: Arc<dyn Notifier>,
    target: ExportTarget,
    path: Option<Arc<Path>>,
    settle: Option<FrameHandle>,
    export_pending: bool,
    now: Duration,
    vehicle_builds: u64,
    vehicle_disposals: u64,
    ended: bool,
}

impl AnimationSession {
    /// Session with the default map style, encoder factory and logging notifier.
    pub fn new(canvas: Canvas, opts: AnimationOpts) -> RoutecastResult<Self> {
        Self::with_style(canvas, opts, MapStyle::default())
    }

    /// Session drawing the map with `style`.
    pub fn with_style(canvas: Canvas, opts: AnimationOpts, style: MapStyle) -> RoutecastResult<Self> {
        opts.validate()?;
        canvas.validate()?;
        Ok(Self {
            state: AnimationState::default(),
            scheduler: FrameScheduler::new(),
            sampler: PathSampler::new(opts.sampler_look_ahead),
            animator: CameraTrailAnimator::new(canvas, style, opts.camera)?,
            vehicle: None,
            rotation: RotationSmoother::new(opts.rotation_smoothing),
            compositor: FrameCompositor::new(),
            capture: CaptureController::new(Arc::new(DefaultEncoderFactory::new()), opts.capture),
            notifier: Arc::new(TracingNotifier),
            target: ExportTarget::default(),
            path: None,
            settle: None,
            export_pending: false,
            now: Duration::ZERO,
            vehicle_builds: 0,
            vehicle_disposals: 0,
            ended: false,
            opts,
        })
    }

    /// Replace how recordings are encoded.
    pub fn with_encoder_factory(mut self, factory: Arc<dyn EncoderFactory>) -> Self {
        self.capture = CaptureController::new(factory, self.opts.capture);
        self
    }

    /// Route user notifications somewhere other than the log.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Write finished videos to `target`.
    pub fn with_export_target(mut self, target: ExportTarget) -> Self {
        self.target = target;
        self
    }

    /// Playback flags and user controls.
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Tunables the session was built with.
    pub fn opts(&self) -> &AnimationOpts {
        &self.opts
    }

    /// The travelled path, if one is set.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Display time of the latest frame seen.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Map camera, trail and marker.
    pub fn animator(&self) -> &CameraTrailAnimator {
        &self.animator
    }

    /// Vehicle drawable; `None` until the first play or still frame.
    pub fn vehicle(&self) -> Option<&VehicleSurface> {
        self.vehicle.as_ref()
    }

    /// Recording state of the export.
    pub fn capture(&self) -> &CaptureController {
        &self.capture
    }

    /// Whether the compositor loop has a frame pending.
    pub fn is_compositing(&self) -> bool {
        self.compositor.is_running()
    }

    /// Most recent composed frame of the export loop.
    pub fn composite_frame(&self) -> Option<&FrameRGBA> {
        self.compositor.output()
    }

    /// Vehicle drawables constructed so far.
    pub fn vehicle_builds(&self) -> u64 {
        self.vehicle_builds
    }

    /// Vehicle drawables released so far; never exceeds the builds.
    pub fn vehicle_disposals(&self) -> u64 {
        self.vehicle_disposals
    }

    /// Whether more frames (or an export finalization) are needed.
    pub fn has_pending_work(&self) -> bool {
        self.export_pending || !self.scheduler.is_idle()
    }

    /// Replace the travelled path. Any playback or export in flight is stopped.
    pub fn set_path(&mut self, path: Option<Path>) -> RoutecastResult<()> {
        self.halt();
        self.sampler.reset(&mut self.scheduler);
        self.dispose_vehicle();
        self.animator.remove_marker();
        self.state.progress = 0.0;
        self.path = path.map(Arc::new);
        self.animator.set_route(self.path.clone())
    }

    /// Replace the stop badges.
    pub fn set_stops(&mut self, stops: Vec<LngLat>) -> RoutecastResult<()> {
        self.animator.set_stops(stops)
    }

    /// Speed multiplier for the next run.
    pub fn set_speed(&mut self, speed: f64) -> RoutecastResult<()> {
        self.state.speed = AnimationState::validate_speed(speed)?;
        Ok(())
    }

    /// Switch vehicle kind. A paused vehicle is rebuilt at once; a moving one on the next play.
    pub fn set_vehicle(&mut self, kind: VehicleKind) -> RoutecastResult<()> {
        if self.state.vehicle == kind {
            return Ok(());
        }
        self.state.vehicle = kind;
        self.refresh_vehicle()
    }

    /// Vehicle display scale; rebuilds a paused vehicle like [`AnimationSession::set_vehicle`].
    pub fn set_vehicle_size(&mut self, size: f64) -> RoutecastResult<()> {
        let size = AnimationState::validate_vehicle_size(size)?;
        if self.state.vehicle_size == size {
            return Ok(());
        }
        self.state.vehicle_size = size;
        self.refresh_vehicle()
    }

    /// Start playback from the beginning. Returns `false` without a path or during an export.
    pub fn play(&mut self) -> RoutecastResult<bool> {
        let Some(path) = self.path.clone() else {
            return Ok(false);
        };
        if self.state.is_recording {
            return Ok(false);
        }
        self.state.is_playing = true;
        self.state.progress = 0.0;
        self.begin_run(path)?;
        Ok(true)
    }

    /// Stop playback where it is. Pausing an export cancels the recording.
    pub fn pause(&mut self) -> bool {
        if !self.state.is_playing {
            return false;
        }
        self.halt();
        true
    }

    /// Stop, clear trail and vehicle, and frame the whole route again.
    pub fn reset(&mut self) -> RoutecastResult<bool> {
        if self.path.is_none() {
            return Ok(false);
        }
        self.halt();
        self.sampler.reset(&mut self.scheduler);
        self.dispose_vehicle();
        self.animator.reset()?;
        self.state.progress = 0.0;
        Ok(true)
    }

    /// Start recording the composed surface at display time `now`, then start playback after
    /// the settle delay.
    ///
    /// Returns `false` without a path, while an export is already running, or when the
    /// recording could not start (the user is notified).
    pub fn export(&mut self, now: Duration) -> bool {
        if self.path.is_none() || self.state.is_recording {
            return false;
        }
        self.now = self.now.max(now);
        let now = self.now;
        self.sampler.stop(&mut self.scheduler);

        let overlay = self.vehicle.as_ref().and_then(VehicleSurface::surface);
        let surface = compose(
            self.animator.frame(),
            overlay,
            self.animator.marker_screen_position(),
        );
        if let Err(e) = self.capture.start_recording(&surface, now) {
            self.notifier.error(&recording_failed(&e));
            self.state.is_playing = false;
            return false;
        }

        self.compositor.start(&mut self.scheduler, SessionTask::Composite);
        self.state.is_recording = true;
        self.state.is_playing = true;
        self.state.progress = 0.0;
        // The sampler must not start before the encoder has its first frames.
        self.settle = Some(
            self.scheduler
                .set_timeout(now + self.opts.settle_delay, SessionTask::Settle),
        );
        tracing::info!(settle_ms = self.opts.settle_delay.as_millis() as u64, "export started");
        true
    }

    /// Run every callback due at display time `now`.
    pub fn advance(&mut self, now: Duration) -> RoutecastResult<Vec<SessionEvent>> {
        self.now = self.now.max(now);
        let now = self.now;
        let mut events = Vec::new();
        for (handle, task) in self.scheduler.take_due(now) {
            match task {
                SessionTask::Settle => {
                    if self.settle != Some(handle) {
                        continue;
                    }
                    self.settle = None;
                    if let Some(path) = self.path.clone() {
                        self.begin_run(path)?;
                    }
                }
                SessionTask::Sample => self.on_sample(handle, now, &mut events)?,
                SessionTask::Composite => self.on_composite(handle, now, &mut events)?,
            }
        }
        Ok(events)
    }

    /// Finalize a completed export and write the video file.
    ///
    /// Returns the written path, or `None` when nothing was pending or the export failed
    /// (the user is notified either way).
    pub async fn finish_export(&mut self) -> Option<PathBuf> {
        if !self.export_pending {
            return None;
        }
        self.export_pending = false;
        let finished = self.capture.stop_recording().await;
        self.state.is_recording = false;

        let delivered = finished.and_then(|asset| match asset {
            Some(asset) => deliver_download(&asset, &self.target.dir, &self.target.prefix).map(Some),
            None => Ok(None),
        });
        match delivered {
            Ok(Some(path)) => {
                self.notifier.success(EXPORT_SUCCESS);
                Some(path)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                self.notifier.error(&recording_failed(&e));
                None
            }
        }
    }

    /// Compose a still frame at `progress` without starting playback.
    pub fn render_at(&mut self, progress: f64) -> RoutecastResult<FrameRGBA> {
        if self.state.is_playing {
            return Err(RoutecastError::validation(
                "cannot render a still frame during playback",
            ));
        }
        let Some(path) = self.path.clone() else {
            return Err(RoutecastError::validation("no path to render"));
        };
        let position = sample(&path, progress, self.opts.sampler_look_ahead);
        self.animator.apply(&position)?;
        if self.vehicle.is_none() {
            self.rebuild_vehicle()?;
        }
        let heading = position.bearing_deg.unwrap_or(self.rotation.current());
        if let Some(v) = self.vehicle.as_mut() {
            v.set_rotation(heading)?;
        }
        let overlay = self.vehicle.as_ref().and_then(VehicleSurface::surface);
        Ok(compose(
            self.animator.frame(),
            overlay,
            self.animator.marker_screen_position(),
        ))
    }

    /// Tear down every loop, recording and surface. Safe to call repeatedly.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.sampler.reset(&mut self.scheduler);
        self.stop_export();
        self.dispose_vehicle();
        self.state.is_playing = false;
        tracing::debug!("session ended");
    }

    fn begin_run(&mut self, path: Arc<Path>) -> RoutecastResult<()> {
        self.rotation.reset();
        self.rebuild_vehicle()?;
        self.animator.place_marker(path.start());
        let total = self
            .opts
            .duration
            .total_duration(path.length_km(), self.state.speed);
        self.sampler
            .start(&mut self.scheduler, SessionTask::Sample, path, total);
        Ok(())
    }

    fn on_sample(
        &mut self,
        handle: FrameHandle,
        now: Duration,
        events: &mut Vec<SessionEvent>,
    ) -> RoutecastResult<()> {
        let Some(tick) = self
            .sampler
            .tick(&mut self.scheduler, handle, now, SessionTask::Sample)
        else {
            return Ok(());
        };
        let position = tick.position;
        self.animator.apply(&position)?;
        let heading = self.rotation.update(position.bearing_deg);
        if position.bearing_deg.is_some()
            && let Some(v) = self.vehicle.as_mut()
        {
            v.set_rotation(heading)?;
        }
        self.state.progress = position.progress;
        events.push(SessionEvent::Progress(position.progress));

        if tick.completed {
            self.state.is_playing = false;
            self.state.progress = 1.0;
            if self.state.is_recording {
                // Nothing may reach the encoder after the last sampled frame.
                self.compositor.stop(&mut self.scheduler);
                self.export_pending = true;
                events.push(SessionEvent::ExportReady);
            } else {
                events.push(SessionEvent::Completed);
            }
        }
        Ok(())
    }

    fn on_composite(
        &mut self,
        handle: FrameHandle,
        now: Duration,
        events: &mut Vec<SessionEvent>,
    ) -> RoutecastResult<()> {
        let overlay = self.vehicle.as_ref().and_then(VehicleSurface::surface);
        let anchor = self.animator.marker_screen_position();
        let Some(frame) = self.compositor.tick(
            &mut self.scheduler,
            handle,
            SessionTask::Composite,
            self.animator.frame(),
            overlay,
            anchor,
        )?
        else {
            return Ok(());
        };
        if let Err(e) = self.capture.capture_frame(frame, now) {
            tracing::warn!(error = %e, "capture failed mid-recording");
            let settling = self.settle.is_some();
            self.stop_export();
            let message = recording_failed(&e);
            self.notifier.error(&message);
            events.push(SessionEvent::CaptureFailed(message));
            // Playback goes on without the recording, even if it had not started yet.
            if settling && let Some(path) = self.path.clone() {
                self.begin_run(path)?;
            }
        }
        Ok(())
    }

    /// Stop the sampler; an export in flight is cancelled.
    fn halt(&mut self) {
        self.sampler.stop(&mut self.scheduler);
        if self.state.is_recording && self.stop_export() {
            self.notifier.error(EXPORT_CANCELLED);
        }
        self.state.is_playing = false;
    }

    /// Drop the settle timer, compositor loop and recording. Returns `true` if a recording
    /// was discarded.
    fn stop_export(&mut self) -> bool {
        if let Some(h) = self.settle.take() {
            self.scheduler.cancel(h);
        }
        self.compositor.stop(&mut self.scheduler);
        self.export_pending = false;
        self.state.is_recording = false;
        self.capture.cancel()
    }

    fn refresh_vehicle(&mut self) -> RoutecastResult<()> {
        if self.state.is_playing || self.vehicle.is_none() {
            return Ok(());
        }
        self.rebuild_vehicle()
    }

    fn rebuild_vehicle(&mut self) -> RoutecastResult<()> {
        self.dispose_vehicle();
        let size_px = vehicle_pixel_size(self.opts.vehicle_base_px, self.state.vehicle_size);
        let mut surface = VehicleSurface::new(self.state.vehicle, size_px)?;
        surface.set_rotation(self.rotation.current())?;
        self.vehicle = Some(surface);
        self.vehicle_builds += 1;
        Ok(())
    }

    fn dispose_vehicle(&mut self) {
        if let Some(mut v) = self.vehicle.take()
            && v.dispose()
        {
            self.vehicle_disposals += 1;
        }
    }
}

impl Drop for AnimationSession {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/session.rs"]
mod tests;
