use std::path::Path;

use crate::compose::ComposedFrame;
use crate::encode::encoder::{
    EncodeSettings, EncodeStrategy, EncodedVideo, VideoEncoder, canonical_size, check_overwrite,
    load_canonical,
};
use crate::encode::ffmpeg::{
    FfmpegProcess, RawVideoArgs, ensure_parent_dir, flatten_premul_over_bg_to_opaque_rgba8,
};
use crate::foundation::core::FrameSize;
use crate::foundation::error::EncodeError;
use crate::foundation::math::premultiply_rgba8_in_place;

/// Streams every composed frame into one `ffmpeg` process, repeated for its duration.
#[derive(Clone, Debug)]
pub struct SequenceEncoder {
    settings: EncodeSettings,
    codec: &'static str,
}

impl SequenceEncoder {
    pub fn new(settings: EncodeSettings, codec: &'static str) -> Self {
        Self { settings, codec }
    }

    fn feed(
        &self,
        proc: &mut FfmpegProcess,
        frames: &[ComposedFrame],
        size: FrameSize,
        progress: &mut dyn FnMut(f64),
    ) -> Result<u64, EncodeError> {
        let mut opaque = vec![0u8; size.width as usize * size.height as usize * 4];
        let steps = (frames.len() + 1) as f64;
        let mut written = 0u64;
        for (i, frame) in frames.iter().enumerate() {
            let mut rgba = load_canonical(&frame.path, size)?.into_raw();
            premultiply_rgba8_in_place(&mut rgba);
            flatten_premul_over_bg_to_opaque_rgba8(&mut opaque, &rgba, self.settings.bg_rgba)?;

            let hold = self.settings.fps.hold_frames(frame.duration_s);
            for _ in 0..hold {
                proc.write_frame(&opaque)?;
            }
            written += hold;
            progress((i + 1) as f64 / steps);
        }
        Ok(written)
    }
}

impl VideoEncoder for SequenceEncoder {
    fn strategy(&self) -> EncodeStrategy {
        EncodeStrategy::Sequence
    }

    #[tracing::instrument(skip(self, frames, progress), fields(frames = frames.len(), codec = self.codec))]
    fn encode(
        &mut self,
        frames: &[ComposedFrame],
        out_path: &Path,
        progress: &mut dyn FnMut(f64),
    ) -> Result<EncodedVideo, EncodeError> {
        let size = canonical_size(frames)?;
        ensure_parent_dir(out_path)?;
        check_overwrite(out_path, self.settings.overwrite)?;

        let mut proc = FfmpegProcess::spawn_rawvideo(&RawVideoArgs {
            size,
            fps: self.settings.fps,
            codec: self.codec,
            out_path,
            overwrite: self.settings.overwrite,
        })?;

        let written = match self.feed(&mut proc, frames, size, progress) {
            Ok(n) => n,
            Err(e) => {
                let stderr = proc.abort();
                if !stderr.trim().is_empty() {
                    tracing::debug!(stderr = %stderr.trim(), "ffmpeg stderr after abort");
                }
                return Err(e);
            }
        };
        proc.finish()?;
        progress(1.0);

        let video = EncodedVideo {
            path: out_path.to_path_buf(),
            size,
            fps: self.settings.fps,
            duration_s: self.settings.fps.frames_to_secs(written),
            frames: written,
            codec: self.codec.to_owned(),
            strategy: EncodeStrategy::Sequence,
        };
        tracing::info!(path = %out_path.display(), duration_s = video.duration_s, "video encoded");
        Ok(video)
    }
}
