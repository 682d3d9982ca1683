use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::capture::{ChunkEncoder, ContainerFormat, EncoderConfig, InProcessEncoderFactory};
use crate::session::notify::RecordingNotifier;

const FRAME: Duration = Duration::from_nanos(16_666_667);

fn equator_path() -> Path {
    Path::new(vec![LngLat::new(0.0, 0.0), LngLat::new(4.5, 0.0), LngLat::new(9.0, 0.0)]).unwrap()
}

/// Encoder whose stdin "breaks" once it has accepted `fail_at` frames.
struct FlakyEncoder {
    pushed: usize,
    fail_at: Option<usize>,
}

impl ChunkEncoder for FlakyEncoder {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Y4m
    }

    fn push_frame(&mut self, _frame: &FrameRGBA) -> RoutecastResult<()> {
        if self.fail_at.is_some_and(|n| self.pushed >= n) {
            return Err(RoutecastError::capture("broken pipe"));
        }
        self.pushed += 1;
        Ok(())
    }

    fn take_chunk(&mut self) -> RoutecastResult<Vec<u8>> {
        Ok(vec![0; self.pushed])
    }

    fn finish(self: Box<Self>) -> RoutecastResult<Vec<u8>> {
        Ok(vec![1])
    }

    fn abort(self: Box<Self>) {}
}

/// Hands out encoders that fail per `plan`, one entry per created encoder; later ones never fail.
struct FlakyFactory {
    plan: Vec<Option<usize>>,
    created: AtomicUsize,
}

impl FlakyFactory {
    fn new(plan: Vec<Option<usize>>) -> Arc<Self> {
        Arc::new(Self {
            plan,
            created: AtomicUsize::new(0),
        })
    }
}

impl EncoderFactory for FlakyFactory {
    fn supports(&self, format: ContainerFormat) -> bool {
        format == ContainerFormat::Y4m
    }

    fn create(
        &self,
        _format: ContainerFormat,
        _cfg: EncoderConfig,
    ) -> RoutecastResult<Box<dyn ChunkEncoder>> {
        let i = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FlakyEncoder {
            pushed: 0,
            fail_at: self.plan.get(i).copied().flatten(),
        }))
    }
}

fn session() -> (AnimationSession, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let dir = std::env::temp_dir().join("routecast-session-unit");
    let s = AnimationSession::new(
        Canvas {
            width: 96,
            height: 64,
        },
        AnimationOpts::default(),
    )
    .unwrap()
    .with_encoder_factory(Arc::new(InProcessEncoderFactory))
    .with_notifier(notifier.clone())
    .with_export_target(ExportTarget {
        dir,
        prefix: "unit".into(),
    });
    (s, notifier)
}

/// Advance frame by frame from `from` for `n` frames, collecting events.
fn run_frames(s: &mut AnimationSession, from: Duration, n: u32) -> (Vec<SessionEvent>, Duration) {
    let mut events = Vec::new();
    let mut now = from;
    for _ in 0..n {
        events.extend(s.advance(now).unwrap());
        now += FRAME;
    }
    (events, now)
}

#[test]
fn controls_are_gated_on_a_path() {
    let (mut s, notifier) = session();
    assert!(!s.play().unwrap());
    assert!(!s.reset().unwrap());
    assert!(!s.export(Duration::ZERO));
    assert!(!s.capture().is_recording());
    assert!(!s.is_compositing());
    assert!(!s.has_pending_work());
    assert!(notifier.notices().is_empty());
}

#[test]
fn playback_completes_exactly_once() {
    let (mut s, _) = session();
    s.set_path(Some(equator_path())).unwrap();
    s.set_speed(5.0).unwrap();
    assert!(s.play().unwrap());
    assert!(s.state().is_playing);

    let (events, _) = run_frames(&mut s, Duration::ZERO, 200);
    let completions = events
        .iter()
        .filter(|e| **e == SessionEvent::Completed)
        .count();
    assert_eq!(completions, 1);
    assert!(!s.state().is_playing);
    assert_eq!(s.state().progress, 1.0);
    assert!(!s.has_pending_work());

    let progress: Vec<f64> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.first().copied(), Some(0.0));
}

#[test]
fn pause_cancels_the_pending_tick() {
    let (mut s, _) = session();
    s.set_path(Some(equator_path())).unwrap();
    s.play().unwrap();
    let (_, now) = run_frames(&mut s, Duration::ZERO, 10);
    let held = s.state().progress;
    assert!(s.pause());
    assert!(!s.pause());
    let (events, _) = run_frames(&mut s, now, 10);
    assert!(events.is_empty());
    assert_eq!(s.state().progress, held);
    assert!(!s.has_pending_work());
}

#[test]
fn vehicle_change_while_paused_rebuilds_once() {
    let (mut s, _) = session();
    s.set_path(Some(equator_path())).unwrap();
    s.play().unwrap();
    run_frames(&mut s, Duration::ZERO, 5);
    s.pause();
    let builds = s.vehicle_builds();
    let disposals = s.vehicle_disposals();

    s.set_vehicle(VehicleKind::Car).unwrap();
    assert_eq!(s.vehicle_disposals(), disposals + 1);
    assert_eq!(s.vehicle_builds(), builds + 1);
    let v = s.vehicle().unwrap();
    assert_eq!(v.kind(), VehicleKind::Car);
    assert!(v.surface().is_some());
}

#[test]
fn vehicle_change_while_playing_waits_for_next_play() {
    let (mut s, _) = session();
    s.set_path(Some(equator_path())).unwrap();
    s.play().unwrap();
    let builds = s.vehicle_builds();
    s.set_vehicle(VehicleKind::Ship).unwrap();
    assert_eq!(s.vehicle_builds(), builds);
    assert_eq!(s.vehicle().unwrap().kind(), VehicleKind::Plane);
    s.play().unwrap();
    assert_eq!(s.vehicle().unwrap().kind(), VehicleKind::Ship);
}

#[test]
fn out_of_range_controls_are_rejected() {
    let (mut s, _) = session();
    assert!(s.set_speed(0.1).is_err());
    assert!(s.set_vehicle_size(3.0).is_err());
    assert_eq!(s.state().speed, 1.0);
    s.set_vehicle_size(2.0).unwrap();
    assert_eq!(s.state().vehicle_size, 2.0);
}

#[test]
fn sampler_waits_for_the_settle_delay() {
    let (mut s, _) = session();
    s.set_path(Some(equator_path())).unwrap();
    assert!(s.export(Duration::ZERO));
    assert!(s.capture().is_recording());
    assert!(s.state().is_recording && s.state().is_playing);

    // 150 ms of frames: compositing only.
    let (events, now) = run_frames(&mut s, Duration::ZERO, 9);
    assert!(events.is_empty());
    assert!(s.composite_frame().is_some());

    let (events, _) = run_frames(&mut s, now.max(Duration::from_millis(200)), 3);
    assert!(events.iter().any(|e| matches!(e, SessionEvent::Progress(_))));
}

#[test]
fn export_is_refused_while_recording() {
    let (mut s, _) = session();
    s.set_path(Some(equator_path())).unwrap();
    assert!(s.export(Duration::ZERO));
    assert!(!s.export(Duration::ZERO));
    assert!(!s.play().unwrap());
}

#[test]
fn pausing_an_export_cancels_it() {
    let (mut s, notifier) = session();
    s.set_path(Some(equator_path())).unwrap();
    s.export(Duration::ZERO);
    run_frames(&mut s, Duration::ZERO, 20);
    assert!(s.pause());
    assert!(!s.capture().is_recording());
    assert!(!s.is_compositing());
    assert!(!s.state().is_recording);
    assert_eq!(notifier.messages(), vec![EXPORT_CANCELLED.to_string()]);
    assert!(!s.has_pending_work());
}

#[test]
fn end_is_idempotent_and_stops_every_loop() {
    let (mut s, _) = session();
    s.set_path(Some(equator_path())).unwrap();
    s.export(Duration::ZERO);
    run_frames(&mut s, Duration::ZERO, 20);
    s.end();
    s.end();
    assert!(!s.has_pending_work());
    assert!(s.vehicle().is_none());
    assert!(!s.capture().is_recording());
    assert_eq!(s.vehicle_disposals(), s.vehicle_builds());
}

#[test]
fn still_frame_places_the_vehicle_on_the_route() {
    let (mut s, _) = session();
    s.set_path(Some(equator_path())).unwrap();
    let frame = s.render_at(0.5).unwrap();
    assert_eq!((frame.width, frame.height), (96, 64));
    assert!(s.animator().marker().is_some());
    assert!(s.vehicle().is_some());
    s.play().unwrap();
    assert!(s.render_at(0.5).is_err());
}

#[test]
fn export_anchors_capture_and_settle_at_the_given_time() {
    let (mut s, _) = session();
    s.set_path(Some(equator_path())).unwrap();
    s.set_speed(5.0).unwrap();
    s.play().unwrap();
    let (_, now) = run_frames(&mut s, Duration::ZERO, 200);
    assert!(!s.has_pending_work());

    // A minute of idle display time before the export.
    let t = now + Duration::from_secs(60);
    assert!(s.export(t));
    assert!(s.advance(t).unwrap().is_empty());
    assert_eq!(s.capture().frames_captured(), 1);

    let (events, _) = run_frames(&mut s, t + FRAME, 11);
    assert!(events.is_empty());
    assert!(s.capture().frames_captured() <= 7);

    let (events, _) = run_frames(&mut s, t + Duration::from_millis(200), 3);
    assert!(events.iter().any(|e| matches!(e, SessionEvent::Progress(_))));
}

#[test]
fn failed_capture_start_notifies_and_allows_a_retry() {
    let (s, notifier) = session();
    let mut s = s.with_encoder_factory(FlakyFactory::new(vec![Some(0)]));
    s.set_path(Some(equator_path())).unwrap();

    assert!(!s.export(Duration::ZERO));
    assert!(!s.capture().is_recording());
    assert!(!s.state().is_recording);
    assert!(!s.state().is_playing);
    assert!(!s.is_compositing());
    assert!(!s.has_pending_work());
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Recording failed:"), "{messages:?}");

    assert!(s.export(Duration::ZERO));
    assert!(s.capture().is_recording());
    assert!(s.state().is_recording);
    assert!(s.is_compositing());
}

#[test]
fn capture_failure_mid_recording_keeps_playback_going() {
    // Before and after the settle delay has elapsed.
    for fail_at in [3, 20] {
        let (s, notifier) = session();
        let mut s = s.with_encoder_factory(FlakyFactory::new(vec![Some(fail_at)]));
        s.set_path(Some(equator_path())).unwrap();
        assert!(s.export(Duration::ZERO));

        let (events, _) = run_frames(&mut s, Duration::ZERO, 700);
        let failures = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::CaptureFailed(_)))
            .count();
        assert_eq!(failures, 1, "fail_at {fail_at}");
        assert!(events.contains(&SessionEvent::Completed), "fail_at {fail_at}");
        assert!(!events.contains(&SessionEvent::ExportReady));
        assert!(!s.is_compositing());
        assert!(!s.capture().is_recording());
        assert!(!s.state().is_recording);
        assert!(!s.state().is_playing);
        assert_eq!(s.state().progress, 1.0);
        assert!(!s.has_pending_work());

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], "Recording failed: capture error: broken pipe");
    }
}
