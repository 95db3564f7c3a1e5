//! reelcraft turns ordered text segments and images into a narrated slideshow video.
//!
//! Each text is wrapped and sized onto a copy of an image, and the composed frames are joined
//! into an MP4 through the system `ffmpeg`:
//!
//! - Build a [`Pipeline`] from a [`PipelineConfig`]
//! - Run it on a [`PipelineInput`] with a progress callback
//! - Read the [`VideoProject`]; frames are always there, the video only when encoding worked
#![forbid(unsafe_code)]

mod foundation;

/// Images, fonts and media probing.
pub mod assets;
/// Burning text into images.
pub mod compose;
/// JSON configuration.
pub mod config;
/// Video assembly.
pub mod encode;
/// Run orchestration.
pub mod pipeline;
/// Pairing texts with images.
pub mod sequence;
/// Text shaping and layout.
pub mod text;

pub use crate::foundation::core::{Fps, FrameSize, Point, Rect, Rgba8};
pub use crate::foundation::error::{
    EncodeError, EncodeFailure, EncodeFailureKind, ReelError, ReelResult,
};

pub use crate::assets::font::{FontAsset, FontResolver};
pub use crate::assets::image::{ImageAsset, ImageOrigin};
pub use crate::compose::{ComposedFrame, ImageComposer, PanelStyle};
pub use crate::config::{DurationPolicy, PipelineConfig};
pub use crate::encode::{
    BackendCaps, ClipConcatEncoder, EncodeSettings, EncodeStrategy, EncodedVideo,
    SequenceEncoder, UnavailableEncoder, VideoEncoder, probe_backend, select_encoder,
};
pub use crate::pipeline::{Pipeline, PipelineInput, ProgressTracker, SkippedItem, VideoProject};
pub use crate::sequence::{TextSegment, WorkItem, pair};
pub use crate::text::{LayoutConfig, LayoutResult, TextLayoutEngine, VerticalAnchor};
