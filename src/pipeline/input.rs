use std::path::{Path, PathBuf};

use crate::assets::image::ImageAsset;

/// Everything one run works from. Never modified by the pipeline.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipelineInput {
    /// Ordered text segments, one per frame before cycling.
    pub texts: Vec<String>,
    pub images: Vec<ImageAsset>,
    /// Project title. The first text is used when absent or blank.
    #[serde(default)]
    pub title: Option<String>,
    /// Preferred font file.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    /// Where the texts came from (for example an article URL). Carried through untouched.
    #[serde(default)]
    pub source_ref: Option<String>,
}

impl PipelineInput {
    pub fn new(texts: Vec<String>, images: Vec<ImageAsset>) -> Self {
        Self {
            texts,
            images,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }

    pub fn font_path(&self) -> Option<&Path> {
        self.font_path.as_deref()
    }

    /// The explicit title, or the first text segment.
    pub fn effective_title(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| self.texts.first().map(|t| t.trim()))
            .unwrap_or_default()
            .to_owned()
    }
}
