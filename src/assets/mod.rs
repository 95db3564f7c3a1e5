//! Input assets: base images, fonts, and probing of encoded media.

/// Font resolution and the cached system fallback.
pub mod font;
/// Base image references with lazily read dimensions.
pub mod image;
/// `ffprobe`-based inspection of encoded videos.
pub mod media;
