use super::*;
use crate::capture::encoder::InProcessEncoderFactory;

fn controller() -> CaptureController {
    CaptureController::new(Arc::new(InProcessEncoderFactory), CaptureConfig::default())
}

fn surface() -> FrameRGBA {
    let mut f = FrameRGBA::new_transparent(8, 6).unwrap();
    f.clear([10, 20, 30, 255]);
    f
}

struct BrokenFactory;

impl EncoderFactory for BrokenFactory {
    fn supports(&self, _format: ContainerFormat) -> bool {
        true
    }

    fn create(
        &self,
        _format: ContainerFormat,
        _cfg: EncoderConfig,
    ) -> RoutecastResult<Box<dyn ChunkEncoder>> {
        Err(RoutecastError::capture("no encoder"))
    }
}

#[tokio::test]
async fn stop_while_idle_resolves_to_none() {
    let mut c = controller();
    assert!(c.stop_recording().await.unwrap().is_none());
    assert_eq!(c.state(), CaptureState::Idle);
}

#[test]
fn start_picks_the_supported_format_and_takes_a_frame() {
    let mut c = controller();
    let format = c.start_recording(&surface(), Duration::ZERO).unwrap();
    assert_eq!(format, ContainerFormat::Y4m);
    assert!(c.is_recording());
    assert_eq!(c.format(), Some(ContainerFormat::Y4m));
}

#[test]
fn starting_twice_is_refused() {
    let mut c = controller();
    c.start_recording(&surface(), Duration::ZERO).unwrap();
    let err = c.start_recording(&surface(), Duration::ZERO).unwrap_err();
    assert!(err.to_string().starts_with("capture error:"));
    assert!(c.is_recording());
}

#[test]
fn encoder_failure_leaves_the_controller_idle() {
    let mut c = CaptureController::new(Arc::new(BrokenFactory), CaptureConfig::default());
    assert!(c.start_recording(&surface(), Duration::ZERO).is_err());
    assert_eq!(c.state(), CaptureState::Idle);
}

/// Accepts construction but rejects every frame, like an ffmpeg that died at codec init.
struct RejectingEncoder;

impl ChunkEncoder for RejectingEncoder {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Y4m
    }

    fn push_frame(&mut self, _frame: &FrameRGBA) -> RoutecastResult<()> {
        Err(RoutecastError::capture("broken pipe"))
    }

    fn take_chunk(&mut self) -> RoutecastResult<Vec<u8>> {
        Ok(Vec::new())
    }

    fn finish(self: Box<Self>) -> RoutecastResult<Vec<u8>> {
        Ok(Vec::new())
    }

    fn abort(self: Box<Self>) {}
}

struct RejectingFactory;

impl EncoderFactory for RejectingFactory {
    fn supports(&self, format: ContainerFormat) -> bool {
        format == ContainerFormat::Y4m
    }

    fn create(
        &self,
        _format: ContainerFormat,
        _cfg: EncoderConfig,
    ) -> RoutecastResult<Box<dyn ChunkEncoder>> {
        Ok(Box::new(RejectingEncoder))
    }
}

#[test]
fn rejected_first_frame_leaves_the_controller_idle() {
    let mut c = CaptureController::new(Arc::new(RejectingFactory), CaptureConfig::default());
    let err = c.start_recording(&surface(), Duration::ZERO).unwrap_err();
    assert!(err.to_string().contains("broken pipe"));
    assert_eq!(c.state(), CaptureState::Idle);
    assert_eq!(c.frames_captured(), 0);
    // A fresh start is not refused as "already active".
    let err = c.start_recording(&surface(), Duration::ZERO).unwrap_err();
    assert!(err.to_string().contains("broken pipe"));
}

#[test]
fn chunks_are_flushed_on_the_interval() {
    let mut c = controller();
    c.start_recording(&surface(), Duration::ZERO).unwrap();
    assert_eq!(c.buffered_chunks(), 0);
    c.capture_frame(&surface(), Duration::from_millis(50)).unwrap();
    assert_eq!(c.buffered_chunks(), 0);
    c.capture_frame(&surface(), Duration::from_millis(100)).unwrap();
    assert_eq!(c.buffered_chunks(), 1);
}

#[tokio::test]
async fn stop_assembles_every_frame() {
    let mut c = controller();
    let s = surface();
    c.start_recording(&s, Duration::ZERO).unwrap();
    for ms in (0..=1000).step_by(16) {
        c.capture_frame(&s, Duration::from_millis(ms)).unwrap();
    }
    let asset = c.stop_recording().await.unwrap().unwrap();
    assert!(!c.is_recording());
    assert_eq!(asset.format, ContainerFormat::Y4m);
    assert_eq!(asset.extension(), "y4m");
    assert!(asset.bytes.starts_with(b"YUV4MPEG2 W8 H6 F30:1"));
    // The last poll at 992 ms sits past boundary 29.
    assert_eq!(asset.frames, 30);
    let frame_markers = asset
        .bytes
        .windows(6)
        .filter(|w| *w == b"FRAME\n")
        .count();
    assert_eq!(frame_markers as u64, asset.frames);
    assert!((asset.duration().as_secs_f64() - 1.0).abs() < 1.0 / 30.0 + 1e-9);
}

#[test]
fn cancel_discards_the_recording() {
    let mut c = controller();
    c.start_recording(&surface(), Duration::ZERO).unwrap();
    assert!(c.cancel());
    assert!(!c.cancel());
    assert_eq!(c.buffered_chunks(), 0);
}
