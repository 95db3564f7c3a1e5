//! Pairs ordered text segments with ordered images.

use crate::assets::image::ImageAsset;

/// One text segment with its position in the input.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextSegment {
    pub index: usize,
    pub text: String,
}

impl TextSegment {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Vec<Self> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Self::new(i, t.as_ref()))
            .collect()
    }
}

/// A text paired with the image it will be drawn on.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkItem {
    pub index: usize,
    pub text: TextSegment,
    pub image: ImageAsset,
}

/// Pair every text with an image, cycling the shorter list from its start.
///
/// Produces `max(texts.len(), images.len())` items, or none when either side is empty.
pub fn pair(texts: &[TextSegment], images: &[ImageAsset]) -> Vec<WorkItem> {
    if texts.is_empty() || images.is_empty() {
        return Vec::new();
    }
    let len = texts.len().max(images.len());
    (0..len)
        .map(|i| WorkItem {
            index: i,
            text: texts[i % texts.len()].clone(),
            image: images[i % images.len()].clone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/unit/sequence.rs"]
mod tests;
