use std::path::{Path, PathBuf};

use crate::compose::ComposedFrame;
use crate::encode::concat::ClipConcatEncoder;
use crate::encode::ffmpeg::BackendCaps;
use crate::encode::sequence::SequenceEncoder;
use crate::foundation::core::{Fps, FrameSize, Rgba8};
use crate::foundation::error::{EncodeError, ReelError, ReelResult};

/// How composed frames are turned into a video.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodeStrategy {
    /// Pick the best strategy for the probed backend.
    #[default]
    Auto,
    /// Stream raw frames into a single `ffmpeg` process.
    Sequence,
    /// One clip per frame, joined with the concat demuxer.
    ClipConcat,
}

impl std::str::FromStr for EncodeStrategy {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "sequence" => Ok(Self::Sequence),
            "clip-concat" => Ok(Self::ClipConcat),
            other => Err(ReelError::validation(format!(
                "unknown encode strategy '{other}' (expected auto, sequence or clip-concat)"
            ))),
        }
    }
}

impl std::fmt::Display for EncodeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Sequence => "sequence",
            Self::ClipConcat => "clip-concat",
        })
    }
}

/// Video output settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    pub fps: Fps,
    pub strategy: EncodeStrategy,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Background used to flatten transparent frames.
    pub bg_rgba: Rgba8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            strategy: EncodeStrategy::Auto,
            overwrite: true,
            bg_rgba: Rgba8::BLACK,
        }
    }
}

impl EncodeSettings {
    pub fn validate(&self) -> ReelResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        Ok(())
    }
}

/// A finished video file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub size: FrameSize,
    pub fps: Fps,
    /// Duration implied by the written video frames.
    pub duration_s: f64,
    /// Number of video frames written.
    pub frames: u64,
    pub codec: String,
    pub strategy: EncodeStrategy,
}

/// Assembles composed frames into one video.
///
/// Implementations report progress in `[0, 1]` after each composed frame and call it with
/// exactly `1.0` once the file is complete.
pub trait VideoEncoder {
    fn strategy(&self) -> EncodeStrategy;

    fn encode(
        &mut self,
        frames: &[ComposedFrame],
        out_path: &Path,
        progress: &mut dyn FnMut(f64),
    ) -> Result<EncodedVideo, EncodeError>;
}

/// Stand-in used when no backend is installed. Every call fails with `BackendMissing`.
#[derive(Clone, Debug)]
pub struct UnavailableEncoder {
    requested: EncodeStrategy,
    reason: String,
}

impl UnavailableEncoder {
    pub fn new(requested: EncodeStrategy, reason: impl Into<String>) -> Self {
        Self {
            requested,
            reason: reason.into(),
        }
    }
}

impl VideoEncoder for UnavailableEncoder {
    fn strategy(&self) -> EncodeStrategy {
        self.requested
    }

    fn encode(
        &mut self,
        _frames: &[ComposedFrame],
        _out_path: &Path,
        _progress: &mut dyn FnMut(f64),
    ) -> Result<EncodedVideo, EncodeError> {
        Err(EncodeError::backend_missing(self.reason.clone()))
    }
}

/// Choose the encoder for `settings` given what the backend supports.
pub fn select_encoder(settings: &EncodeSettings, caps: &BackendCaps) -> Box<dyn VideoEncoder> {
    if !caps.ffmpeg {
        tracing::warn!("ffmpeg not found on PATH; videos will not be encoded");
        return Box::new(UnavailableEncoder::new(
            settings.strategy,
            "ffmpeg is required for video encoding, but was not found on PATH",
        ));
    }
    let codec = caps.video_codec();
    if !caps.libx264 {
        tracing::warn!("libx264 not available; falling back to mpeg4");
    }
    match settings.strategy {
        EncodeStrategy::Auto | EncodeStrategy::Sequence => {
            Box::new(SequenceEncoder::new(settings.clone(), codec))
        }
        EncodeStrategy::ClipConcat => Box::new(ClipConcatEncoder::new(settings.clone(), codec)),
    }
}

/// Video size for a run: the first frame's size rounded down to even numbers.
pub(crate) fn canonical_size(frames: &[ComposedFrame]) -> Result<FrameSize, EncodeError> {
    let first = frames.first().ok_or(EncodeError::NoFrames)?;
    let (w, h) = image::image_dimensions(&first.path)
        .map_err(|e| EncodeError::bad_frame(&first.path, e))?;
    let size = FrameSize::new(w, h).even();
    if size.is_empty() {
        return Err(EncodeError::bad_frame(
            &first.path,
            format!("{w}x{h} is too small to encode"),
        ));
    }
    Ok(size)
}

/// Decode a composed frame, center-cropping and scaling it to `size` when it differs.
pub(crate) fn load_canonical(path: &Path, size: FrameSize) -> Result<image::RgbaImage, EncodeError> {
    let img = image::ImageReader::open(path)
        .map_err(|e| EncodeError::bad_frame(path, e))?
        .with_guessed_format()
        .map_err(|e| EncodeError::bad_frame(path, e))?
        .decode()
        .map_err(|e| EncodeError::bad_frame(path, e))?;
    if img.width() == size.width && img.height() == size.height {
        return Ok(img.to_rgba8());
    }
    tracing::debug!(
        path = %path.display(),
        from = ?(img.width(), img.height()),
        to = ?size,
        "resizing frame to the canonical size"
    );
    Ok(img
        .resize_to_fill(size.width, size.height, image::imageops::FilterType::Triangle)
        .to_rgba8())
}

/// Refuse to clobber an existing file unless `overwrite` is set.
pub(crate) fn check_overwrite(out_path: &Path, overwrite: bool) -> Result<(), EncodeError> {
    if !overwrite && out_path.exists() {
        return Err(EncodeError::backend(format!(
            "output file '{}' already exists",
            out_path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoder.rs"]
mod tests;
