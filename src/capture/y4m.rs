//! In-process YUV4MPEG2 writer (planar 4:4:4, BT.601 limited range).

use crate::capture::encoder::{ChunkEncoder, EncoderConfig, check_frame, flatten_to_opaque_rgba8};
use crate::capture::format::ContainerFormat;
use crate::foundation::error::RoutecastResult;
use crate::render::FrameRGBA;

pub struct Y4mEncoder {
    cfg: EncoderConfig,
    scratch: Vec<u8>,
    pending: Vec<u8>,
    frames: u64,
}

impl Y4mEncoder {
    /// Encoder with the stream header already queued.
    pub fn new(cfg: EncoderConfig) -> RoutecastResult<Self> {
        cfg.validate(ContainerFormat::Y4m)?;
        let header = format!(
            "YUV4MPEG2 W{} H{} F{}:{} Ip A1:1 C444\n",
            cfg.width, cfg.height, cfg.fps.num, cfg.fps.den
        );
        Ok(Self {
            scratch: vec![0; cfg.frame_len()],
            pending: header.into_bytes(),
            cfg,
            frames: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }
}

pub(crate) fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    [y.clamp(0, 255) as u8, u.clamp(0, 255) as u8, v.clamp(0, 255) as u8]
}

impl ChunkEncoder for Y4mEncoder {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Y4m
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> RoutecastResult<()> {
        check_frame(&self.cfg, frame)?;
        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.cfg.bg_rgba,
        )?;

        let plane = self.cfg.width as usize * self.cfg.height as usize;
        let start = self.pending.len() + b"FRAME\n".len();
        self.pending.extend_from_slice(b"FRAME\n");
        self.pending.resize(start + plane * 3, 0);
        let (y, rest) = self.pending[start..].split_at_mut(plane);
        let (u, v) = rest.split_at_mut(plane);
        for (i, px) in self.scratch.chunks_exact(4).enumerate() {
            let [cy, cb, cr] = rgb_to_ycbcr(px[0], px[1], px[2]);
            y[i] = cy;
            u[i] = cb;
            v[i] = cr;
        }
        self.frames += 1;
        Ok(())
    }

    fn take_chunk(&mut self) -> RoutecastResult<Vec<u8>> {
        Ok(std::mem::take(&mut self.pending))
    }

    fn finish(mut self: Box<Self>) -> RoutecastResult<Vec<u8>> {
        tracing::debug!(frames = self.frames, "y4m stream finished");
        Ok(std::mem::take(&mut self.pending))
    }

    fn abort(self: Box<Self>) {}
}

#[cfg(test)]
#[path = "../../tests/unit/capture/y4m.rs"]
mod tests;
