use std::sync::Arc;
use std::time::Duration;

use crate::capture::encoder::{ChunkEncoder, DefaultEncoderFactory, EncoderConfig, EncoderFactory};
use crate::capture::format::{ContainerFormat, select_format};
use crate::capture::stream::CaptureStream;
use crate::foundation::core::Fps;
use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::render::FrameRGBA;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Recording,
}

/// A finished recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoAsset {
    pub bytes: Vec<u8>,
    pub format: ContainerFormat,
    pub frames: u64,
    pub fps: Fps,
}

impl VideoAsset {
    /// Media duration at the recorded frame rate.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.fps.frames_to_secs(self.frames))
    }

    pub fn mime(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    pub fps: Fps,
    /// How often encoded bytes are moved into the chunk buffer.
    pub flush_interval: Duration,
    pub bitrate_bps: u32,
    pub bg_rgba: [u8; 4],
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: Fps { num: 30, den: 1 },
            flush_interval: Duration::from_millis(100),
            bitrate_bps: 5_000_000,
            bg_rgba: [255, 255, 255, 255],
        }
    }
}

struct ActiveCapture {
    format: ContainerFormat,
    encoder: Box<dyn ChunkEncoder>,
    stream: CaptureStream,
    chunks: Vec<Vec<u8>>,
    last_flush: Duration,
}

/// Owns the `idle -> recording -> idle` lifecycle against one surface.
pub struct CaptureController {
    factory: Arc<dyn EncoderFactory>,
    cfg: CaptureConfig,
    active: Option<ActiveCapture>,
}

impl std::fmt::Debug for CaptureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureController")
            .field("cfg", &self.cfg)
            .field("state", &self.state())
            .field("buffered_chunks", &self.buffered_chunks())
            .finish()
    }
}

impl Default for CaptureController {
    fn default() -> Self {
        Self::new(Arc::new(DefaultEncoderFactory::new()), CaptureConfig::default())
    }
}

impl CaptureController {
    /// Idle controller building encoders through `factory`.
    pub fn new(factory: Arc<dyn EncoderFactory>, cfg: CaptureConfig) -> Self {
        Self {
            factory,
            cfg,
            active: None,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.cfg
    }

    pub fn state(&self) -> CaptureState {
        if self.active.is_some() {
            CaptureState::Recording
        } else {
            CaptureState::Idle
        }
    }

    /// Whether an encoder is active.
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Format of the running recording.
    pub fn format(&self) -> Option<ContainerFormat> {
        self.active.as_ref().map(|a| a.format)
    }

    /// Frames handed to the encoder by the running recording.
    pub fn frames_captured(&self) -> u64 {
        self.active.as_ref().map_or(0, |a| a.stream.frames_emitted())
    }

    /// Chunks buffered since recording started.
    pub fn buffered_chunks(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.chunks.len())
    }

    /// Start encoding `surface` at the configured rate, taking the first frame at `now`.
    ///
    /// The best format the factory supports is used. On failure, including a first frame the
    /// encoder rejects, the controller is left idle.
    pub fn start_recording(
        &mut self,
        surface: &FrameRGBA,
        now: Duration,
    ) -> RoutecastResult<ContainerFormat> {
        if self.active.is_some() {
            return Err(RoutecastError::capture("a recording is already active"));
        }
        let format = select_format(|f| self.factory.supports(f));
        let enc_cfg = EncoderConfig {
            width: surface.width,
            height: surface.height,
            fps: self.cfg.fps,
            bitrate_bps: self.cfg.bitrate_bps,
            bg_rgba: self.cfg.bg_rgba,
        };
        let encoder = self.factory.create(format, enc_cfg).inspect_err(|e| {
            tracing::warn!(error = %e, format = %format, "encoder construction failed");
        })?;
        self.active = Some(ActiveCapture {
            format,
            encoder,
            stream: CaptureStream::new(self.cfg.fps, now),
            chunks: Vec::new(),
            last_flush: now,
        });
        tracing::info!(format = %format, width = surface.width, height = surface.height, "recording started");
        if let Err(e) = self.capture_frame(surface, now) {
            self.cancel();
            return Err(e);
        }
        Ok(format)
    }

    /// Feed the frames that became due by `now`; returns how many were encoded.
    ///
    /// Idle controllers ignore the call.
    pub fn capture_frame(&mut self, surface: &FrameRGBA, now: Duration) -> RoutecastResult<u64> {
        let flush_interval = self.cfg.flush_interval;
        let Some(active) = self.active.as_mut() else {
            return Ok(0);
        };
        let due = active.stream.frames_due(now);
        for _ in 0..due {
            active.encoder.push_frame(surface)?;
        }
        if now.saturating_sub(active.last_flush) >= flush_interval {
            let chunk = active.encoder.take_chunk()?;
            if !chunk.is_empty() {
                active.chunks.push(chunk);
            }
            active.last_flush = now;
        }
        Ok(due)
    }

    /// Finalize the encoder and assemble the asset.
    ///
    /// Resolves to `None` without side effects when no recording is active.
    pub async fn stop_recording(&mut self) -> RoutecastResult<Option<VideoAsset>> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        let ActiveCapture {
            format,
            encoder,
            stream,
            mut chunks,
            ..
        } = active;
        let tail = tokio::task::spawn_blocking(move || encoder.finish())
            .await
            .map_err(|e| RoutecastError::capture(format!("encoder finalize task failed: {e}")))??;
        chunks.push(tail);
        let bytes = chunks.concat();
        if bytes.is_empty() {
            return Err(RoutecastError::capture("encoder produced no data"));
        }
        let asset = VideoAsset {
            bytes,
            format,
            frames: stream.frames_emitted(),
            fps: stream.fps(),
        };
        tracing::info!(
            format = %format,
            frames = asset.frames,
            bytes = asset.bytes.len(),
            "recording finalized"
        );
        Ok(Some(asset))
    }

    /// Drop the recording without producing an asset. Returns `false` when idle.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        tracing::info!(format = %active.format, "recording cancelled");
        active.encoder.abort();
        true
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/controller.rs"]
mod tests;
