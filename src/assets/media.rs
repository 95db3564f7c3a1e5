use std::path::Path;

use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};

/// Basic metadata about an encoded video file.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    pub size: FrameSize,
    /// Container duration in seconds.
    pub duration_s: f64,
    /// Whether ffprobe detected at least one audio stream.
    pub has_audio: bool,
}

/// Probe an encoded video through `ffprobe`.
pub fn probe_video(path: &Path) -> ReelResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: ProbeFormat,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelError::asset(path, format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::asset(
            path,
            format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::serde(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ReelError::asset(path, "no video stream found"))?;
    let (Some(width), Some(height)) = (video.width, video.height) else {
        return Err(ReelError::asset(path, "missing video dimensions from ffprobe"));
    };
    let duration_s = parsed
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| ReelError::asset(path, "missing container duration from ffprobe"))?;

    Ok(VideoInfo {
        size: FrameSize::new(width, height),
        duration_s,
        has_audio: parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio")),
    })
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
