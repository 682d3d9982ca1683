use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread::JoinHandle;

use crate::capture::encoder::{ChunkEncoder, EncoderConfig, check_frame, flatten_to_opaque_rgba8};
use crate::capture::format::ContainerFormat;
use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::render::FrameRGBA;

/// Names of the video encoders the system `ffmpeg` offers; empty when it is missing.
pub fn probe_ffmpeg_encoders() -> Vec<String> {
    let output = match Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(o) if o.status.success() => o,
        _ => {
            tracing::debug!("ffmpeg not available; only in-process encoding");
            return Vec::new();
        }
    };
    let names: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let flags = cols.next()?;
            let name = cols.next()?;
            flags.starts_with('V').then(|| name.to_string())
        })
        .collect();
    tracing::debug!(count = names.len(), "probed ffmpeg video encoders");
    names
}

fn container_args(format: ContainerFormat, bitrate_bps: u32) -> RoutecastResult<Vec<String>> {
    let bitrate = bitrate_bps.to_string();
    let args: Vec<&str> = match format {
        ContainerFormat::WebmVp9 => vec![
            "-c:v", "libvpx-vp9", "-b:v", &bitrate, "-deadline", "realtime", "-pix_fmt", "yuv420p",
            "-f", "webm",
        ],
        ContainerFormat::WebmVp8 => vec![
            "-c:v", "libvpx", "-b:v", &bitrate, "-deadline", "realtime", "-pix_fmt", "yuv420p",
            "-f", "webm",
        ],
        ContainerFormat::Mp4H264 => vec![
            "-c:v",
            "libx264",
            "-b:v",
            &bitrate,
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "frag_keyframe+empty_moov+default_base_moof",
            "-f",
            "mp4",
        ],
        ContainerFormat::Y4m => {
            return Err(RoutecastError::capture(
                "y4m is encoded in-process, not through ffmpeg",
            ));
        }
    };
    Ok(args.into_iter().map(str::to_string).collect())
}

/// Streams raw frames into the system `ffmpeg` and collects container bytes from its stdout.
pub struct FfmpegChunkEncoder {
    format: ContainerFormat,
    cfg: EncoderConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    chunks: Receiver<Vec<u8>>,
    stdout_drain: Option<JoinHandle<std::io::Result<()>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
}

impl FfmpegChunkEncoder {
    /// Start `ffmpeg` writing `format` to stdout.
    pub fn spawn(format: ContainerFormat, cfg: EncoderConfig) -> RoutecastResult<Self> {
        cfg.validate(format)?;
        let codec_args = container_args(format, cfg.bitrate_bps)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Input: flattened RGBA8 frames at the capture rate.
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
        ])
        .args(&codec_args)
        .arg("pipe:1");

        let mut child = cmd.spawn().map_err(|e| {
            RoutecastError::capture(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RoutecastError::capture("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| RoutecastError::capture("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| RoutecastError::capture("failed to open ffmpeg stderr (unexpected)"))?;

        let (tx, rx) = channel();
        let stdout_drain = std::thread::spawn(move || {
            let mut buf = vec![0u8; 64 * 1024];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    return Ok(());
                }
                if tx.send(buf[..n].to_vec()).is_err() {
                    return Ok(());
                }
            }
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::info!(format = %format, width = cfg.width, height = cfg.height, "ffmpeg encoder started");
        Ok(Self {
            format,
            scratch: vec![0u8; cfg.frame_len()],
            cfg,
            child,
            stdin: Some(stdin),
            chunks: rx,
            stdout_drain: Some(stdout_drain),
            stderr_drain: Some(stderr_drain),
        })
    }

    fn drain_ready(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            match self.chunks.try_recv() {
                Ok(chunk) => out.extend_from_slice(&chunk),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return out,
            }
        }
    }
}

impl ChunkEncoder for FfmpegChunkEncoder {
    fn format(&self) -> ContainerFormat {
        self.format
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> RoutecastResult<()> {
        check_frame(&self.cfg, frame)?;
        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.cfg.bg_rgba,
        )?;
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(RoutecastError::capture("ffmpeg encoder is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            RoutecastError::capture(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn take_chunk(&mut self) -> RoutecastResult<Vec<u8>> {
        Ok(self.drain_ready())
    }

    fn finish(mut self: Box<Self>) -> RoutecastResult<Vec<u8>> {
        drop(self.stdin.take());
        let status = self.child.wait().map_err(|e| {
            RoutecastError::capture(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if let Some(handle) = self.stdout_drain.take() {
            handle
                .join()
                .map_err(|_| RoutecastError::capture("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| RoutecastError::capture(format!("ffmpeg stdout read failed: {e}")))?;
        }
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| RoutecastError::capture("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| RoutecastError::capture(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(RoutecastError::capture(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(self.drain_ready())
    }

    fn abort(mut self: Box<Self>) {
        drop(self.stdin.take());
        if let Err(e) = self.child.kill() {
            tracing::debug!(error = %e, "ffmpeg already exited");
        }
        let _ = self.child.wait();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/ffmpeg.rs"]
mod tests;
