//! Video assembly from composed frames through the system `ffmpeg`.

/// Clip-per-frame strategy joined with the concat demuxer.
pub mod concat;
/// Encoder trait, settings, and strategy selection.
pub mod encoder;
/// `ffmpeg` process plumbing and capability probing.
pub mod ffmpeg;
/// Single-process raw-frame streaming strategy.
pub mod sequence;

pub use concat::ClipConcatEncoder;
pub use encoder::{
    EncodeSettings, EncodeStrategy, EncodedVideo, UnavailableEncoder, VideoEncoder,
    select_encoder,
};
pub use ffmpeg::{BackendCaps, is_ffmpeg_on_path, probe_backend};
pub use sequence::SequenceEncoder;
