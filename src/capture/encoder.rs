use std::sync::OnceLock;

use crate::capture::ffmpeg::{FfmpegChunkEncoder, probe_ffmpeg_encoders};
use crate::capture::format::ContainerFormat;
use crate::capture::y4m::Y4mEncoder;
use crate::foundation::core::Fps;
use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::FrameRGBA;

/// Settings shared by every encoder of one recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub bitrate_bps: u32,
    /// Colour transparent pixels are flattened onto.
    pub bg_rgba: [u8; 4],
}

impl EncoderConfig {
    /// Reject sizes or rates `format` cannot carry.
    pub fn validate(&self, format: ContainerFormat) -> RoutecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RoutecastError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if format != ContainerFormat::Y4m
            && (!self.width.is_multiple_of(2) || !self.height.is_multiple_of(2))
        {
            return Err(RoutecastError::validation(
                "encode width/height must be even for yuv420p output",
            ));
        }
        Ok(())
    }

    pub(crate) fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Streaming encoder producing container bytes in chunks.
pub trait ChunkEncoder: Send {
    fn format(&self) -> ContainerFormat;

    /// Encode one frame. Frames must match the configured size.
    fn push_frame(&mut self, frame: &FrameRGBA) -> RoutecastResult<()>;

    /// Bytes produced since the previous call; may be empty.
    fn take_chunk(&mut self) -> RoutecastResult<Vec<u8>>;

    /// Flush and close the stream, returning the remaining bytes.
    fn finish(self: Box<Self>) -> RoutecastResult<Vec<u8>>;

    /// Stop without producing output.
    fn abort(self: Box<Self>);
}

/// Builds encoders for a chosen format.
pub trait EncoderFactory: Send + Sync {
    fn supports(&self, format: ContainerFormat) -> bool;

    fn create(
        &self,
        format: ContainerFormat,
        cfg: EncoderConfig,
    ) -> RoutecastResult<Box<dyn ChunkEncoder>>;
}

/// System `ffmpeg` when available, the in-process Y4M encoder otherwise.
#[derive(Debug, Default)]
pub struct DefaultEncoderFactory {
    ffmpeg_encoders: OnceLock<Vec<String>>,
}

impl DefaultEncoderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn ffmpeg_encoders(&self) -> &[String] {
        self.ffmpeg_encoders.get_or_init(probe_ffmpeg_encoders)
    }
}

impl EncoderFactory for DefaultEncoderFactory {
    fn supports(&self, format: ContainerFormat) -> bool {
        match format.ffmpeg_encoder() {
            None => true,
            Some(name) => self.ffmpeg_encoders().iter().any(|e| e == name),
        }
    }

    fn create(
        &self,
        format: ContainerFormat,
        cfg: EncoderConfig,
    ) -> RoutecastResult<Box<dyn ChunkEncoder>> {
        cfg.validate(format)?;
        match format {
            ContainerFormat::Y4m => Ok(Box::new(Y4mEncoder::new(cfg)?)),
            _ => Ok(Box::new(FfmpegChunkEncoder::spawn(format, cfg)?)),
        }
    }
}

/// In-process encoders only; never spawns a subprocess.
#[derive(Debug, Default, Clone, Copy)]
pub struct InProcessEncoderFactory;

impl EncoderFactory for InProcessEncoderFactory {
    fn supports(&self, format: ContainerFormat) -> bool {
        format == ContainerFormat::Y4m
    }

    fn create(
        &self,
        format: ContainerFormat,
        cfg: EncoderConfig,
    ) -> RoutecastResult<Box<dyn ChunkEncoder>> {
        if format != ContainerFormat::Y4m {
            return Err(RoutecastError::capture(format!(
                "{format} is not available in-process"
            )));
        }
        cfg.validate(format)?;
        Ok(Box::new(Y4mEncoder::new(cfg)?))
    }
}

/// Composite RGBA8 over an opaque background.
pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> RoutecastResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(RoutecastError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }
    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for i in 0..3 {
            let c = if src_is_premul {
                u16::from(s[i])
            } else {
                mul_div255_u16(u16::from(s[i]), a)
            };
            d[i] = (c + mul_div255_u16(bg[i], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Reject frames whose size differs from the encoder's.
pub(crate) fn check_frame(cfg: &EncoderConfig, frame: &FrameRGBA) -> RoutecastResult<()> {
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(RoutecastError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    if frame.data.len() != cfg.frame_len() {
        return Err(RoutecastError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/capture/encoder.rs"]
mod tests;
