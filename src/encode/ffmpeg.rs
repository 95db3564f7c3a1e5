use std::io::{Read, Write as _};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::foundation::core::{Fps, FrameSize, Rgba8};
use crate::foundation::error::EncodeError;
use crate::foundation::math::mul_div255_u16;

/// What the local `ffmpeg` installation can do.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BackendCaps {
    /// `ffmpeg` runs from `PATH`.
    pub ffmpeg: bool,
    /// The `libx264` encoder is compiled in.
    pub libx264: bool,
    /// First line of `ffmpeg -version`.
    pub version: Option<String>,
}

impl BackendCaps {
    /// Video codec to request: H.264 when available, MPEG-4 Part 2 otherwise.
    pub fn video_codec(&self) -> &'static str {
        if self.libx264 { "libx264" } else { "mpeg4" }
    }
}

/// Probe `ffmpeg` once for availability and encoder support.
#[tracing::instrument]
pub fn probe_backend() -> BackendCaps {
    let version = match Command::new("ffmpeg")
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .lines()
            .next()
            .map(|l| l.trim().to_owned()),
        _ => {
            tracing::debug!("ffmpeg not found on PATH");
            return BackendCaps::default();
        }
    };

    let libx264 = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map(|out| {
            String::from_utf8_lossy(&out.stdout)
                .lines()
                .any(|l| l.split_whitespace().nth(1) == Some("libx264"))
        })
        .unwrap_or(false);

    let caps = BackendCaps {
        ffmpeg: true,
        libx264,
        version,
    };
    tracing::debug!(?caps, "probed ffmpeg");
    caps
}

/// Output codec arguments shared by every strategy.
pub(crate) fn push_output_codec(cmd: &mut Command, codec: &str) {
    cmd.args(["-an", "-c:v", codec, "-pix_fmt", "yuv420p"]);
    if codec == "mpeg4" {
        cmd.args(["-q:v", "3"]);
    }
}

pub(crate) fn push_fps(cmd: &mut Command, flag: &str, fps: Fps) {
    cmd.args([flag, &format!("{}/{}", fps.num, fps.den)]);
}

/// Options for a raw RGBA stream into one output file.
#[derive(Clone, Debug)]
pub(crate) struct RawVideoArgs<'a> {
    pub(crate) size: FrameSize,
    pub(crate) fps: Fps,
    pub(crate) codec: &'a str,
    pub(crate) out_path: &'a Path,
    pub(crate) overwrite: bool,
}

/// A running `ffmpeg` that reads opaque RGBA8 frames from stdin.
pub(crate) struct FfmpegProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    frame_len: usize,
}

impl FfmpegProcess {
    pub(crate) fn spawn_rawvideo(args: &RawVideoArgs<'_>) -> Result<Self, EncodeError> {
        if args.size.is_empty() || args.size.even() != args.size {
            return Err(EncodeError::backend(format!(
                "frame size {}x{} must be non-zero and even",
                args.size.width, args.size.height
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if args.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", args.size.width, args.size.height),
        ]);
        // For rawvideo input, `-r` before `-i` sets the input rate.
        push_fps(&mut cmd, "-r", args.fps);
        cmd.args(["-i", "pipe:0"]);
        push_output_codec(&mut cmd, args.codec);
        cmd.args(["-movflags", "+faststart"]);
        cmd.arg(args.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            EncodeError::backend_missing(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EncodeError::backend("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| EncodeError::backend("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
            frame_len: args.size.width as usize * args.size.height as usize * 4,
        })
    }

    pub(crate) fn write_frame(&mut self, rgba: &[u8]) -> Result<(), EncodeError> {
        if rgba.len() != self.frame_len {
            return Err(EncodeError::backend(format!(
                "frame buffer is {} bytes, expected {}",
                rgba.len(),
                self.frame_len
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(EncodeError::backend("ffmpeg stdin is already closed"));
        };
        stdin
            .write_all(rgba)
            .map_err(|e| EncodeError::backend(format!("failed to write frame to ffmpeg: {e}")))
    }

    /// Close stdin and wait for `ffmpeg` to finish writing the file.
    pub(crate) fn finish(mut self) -> Result<(), EncodeError> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| EncodeError::backend(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = self.join_stderr();
        if !status.success() {
            return Err(EncodeError::backend(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }

    /// Kill the process and return whatever it wrote to stderr.
    pub(crate) fn abort(mut self) -> String {
        drop(self.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.join_stderr()
    }

    fn join_stderr(&mut self) -> String {
        let bytes = match self.stderr_drain.take().map(JoinHandle::join) {
            Some(Ok(Ok(bytes))) => bytes,
            Some(Ok(Err(e))) => return format!("(stderr read failed: {e})"),
            Some(Err(_)) => return "(stderr drain thread panicked)".to_owned(),
            None => Vec::new(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Run a one-shot `ffmpeg` command to completion, surfacing stderr on failure.
pub(crate) fn run_to_completion(mut cmd: Command) -> Result<(), EncodeError> {
    let out = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| EncodeError::backend_missing(format!("failed to run ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(EncodeError::backend(format!(
            "ffmpeg exited with status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

/// Flatten premultiplied RGBA8 over an opaque background.
pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg: Rgba8,
) -> Result<(), EncodeError> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(EncodeError::backend(
            "flatten expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg.r);
    let bg_g = u16::from(bg.g);
    let bg_b = u16::from(bg.b);

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> Result<(), EncodeError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            EncodeError::backend(format!(
                "failed to create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
