use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};

/// Where an image came from. Informational only; composition treats both the same.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrigin {
    /// Downloaded from the source article.
    #[default]
    Fetched,
    /// Supplied directly by the user.
    Uploaded,
}

/// A base image on local storage.
///
/// Pixel dimensions are read from the file header on first use and cached.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageAsset {
    path: PathBuf,
    #[serde(default)]
    origin: ImageOrigin,
    #[serde(skip)]
    size: OnceCell<FrameSize>,
}

impl ImageAsset {
    pub fn new(path: impl Into<PathBuf>, origin: ImageOrigin) -> Self {
        Self {
            path: path.into(),
            origin,
            size: OnceCell::new(),
        }
    }

    pub fn fetched(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ImageOrigin::Fetched)
    }

    pub fn uploaded(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ImageOrigin::Uploaded)
    }

    /// Attach already-known dimensions so the header is never read.
    pub fn with_dimensions(self, size: FrameSize) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(size);
        Self { size: cell, ..self }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> ImageOrigin {
        self.origin
    }

    /// Pixel dimensions, read lazily from the image header.
    pub fn dimensions(&self) -> ReelResult<FrameSize> {
        if let Some(size) = self.size.get() {
            return Ok(*size);
        }
        let (width, height) = self
            .reader()?
            .into_dimensions()
            .map_err(|e| ReelError::asset(&self.path, e))?;
        let size = FrameSize::new(width, height);
        if size.is_empty() {
            return Err(ReelError::asset(&self.path, "image has zero width or height"));
        }
        let _ = self.size.set(size);
        Ok(size)
    }

    /// Decode a fresh straight-alpha RGBA8 copy of the image. The file itself is never touched.
    pub fn decode_rgba8(&self) -> ReelResult<image::RgbaImage> {
        let img = self
            .reader()?
            .decode()
            .map_err(|e| ReelError::asset(&self.path, e))?;
        let rgba = img.to_rgba8();
        let _ = self.size.set(FrameSize::new(rgba.width(), rgba.height()));
        Ok(rgba)
    }

    /// Raster format of the file, used to write composed frames in the same format.
    ///
    /// Sniffed from the content; the extension is only consulted when the bytes say nothing.
    pub fn format(&self) -> Option<image::ImageFormat> {
        self.reader()
            .ok()
            .and_then(|r| r.format())
            .or_else(|| image::ImageFormat::from_path(&self.path).ok())
    }

    // Cached images are often stored without an extension, or with the wrong one.
    fn reader(&self) -> ReelResult<image::ImageReader<std::io::BufReader<std::fs::File>>> {
        image::ImageReader::open(&self.path)
            .map_err(|e| ReelError::asset(&self.path, e))?
            .with_guessed_format()
            .map_err(|e| ReelError::asset(&self.path, e))
    }
}

impl PartialEq for ImageAsset {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.origin == other.origin
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;
