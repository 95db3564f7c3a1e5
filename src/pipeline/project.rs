use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::font::FontAsset;
use crate::compose::ComposedFrame;
use crate::encode::EncodedVideo;
use crate::foundation::error::{EncodeFailure, ReelError, ReelResult};

/// A work item that produced no frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SkippedItem {
    pub item: usize,
    pub image: PathBuf,
    pub reason: String,
}

/// Result of one pipeline run.
///
/// Frames are always present; `video` is `None` when encoding failed, with the cause in
/// `encode_failure`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoProject {
    pub title: String,
    pub source_ref: Option<String>,
    pub texts: Vec<String>,
    /// Original base images, in input order.
    pub images: Vec<PathBuf>,
    /// Run directory holding `frames/` and the video.
    pub output_dir: PathBuf,
    pub font: FontAsset,
    pub frames: Vec<ComposedFrame>,
    #[serde(default)]
    pub skipped: Vec<SkippedItem>,
    pub video: Option<EncodedVideo>,
    pub encode_failure: Option<EncodeFailure>,
}

impl VideoProject {
    pub fn video_path(&self) -> Option<&Path> {
        self.video.as_ref().map(|v| v.path.as_path())
    }

    pub fn frame_paths(&self) -> impl Iterator<Item = &Path> {
        self.frames.iter().map(|f| f.path.as_path())
    }

    /// Sum of the frame durations.
    pub fn total_duration_s(&self) -> f64 {
        self.frames.iter().map(|f| f.duration_s).sum()
    }

    /// Write the project as pretty JSON.
    pub fn write_manifest(&self, path: &Path) -> ReelResult<()> {
        let f = File::create(path)
            .with_context(|| format!("failed to create manifest '{}'", path.display()))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, self)
            .map_err(|e| ReelError::serde(format!("write project manifest: {e}")))?;
        w.flush()
            .with_context(|| format!("failed to flush manifest '{}'", path.display()))?;
        Ok(())
    }

    pub fn from_manifest(path: &Path) -> ReelResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("failed to open manifest '{}'", path.display()))?;
        serde_json::from_reader(std::io::BufReader::new(f))
            .map_err(|e| ReelError::serde(format!("parse project manifest: {e}")))
    }
}
