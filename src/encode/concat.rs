use std::path::{Path, PathBuf};
use std::process::Command;

use crate::compose::ComposedFrame;
use crate::encode::encoder::{
    EncodeSettings, EncodeStrategy, EncodedVideo, VideoEncoder, canonical_size, check_overwrite,
    load_canonical,
};
use crate::encode::ffmpeg::{
    ensure_parent_dir, flatten_premul_over_bg_to_opaque_rgba8, push_fps, push_output_codec,
    run_to_completion,
};
use crate::foundation::core::FrameSize;
use crate::foundation::error::EncodeError;
use crate::foundation::math::premultiply_rgba8_in_place;

const LIST_FILE: &str = "list.txt";

/// Encodes one short clip per composed frame, then joins them without re-encoding.
#[derive(Clone, Debug)]
pub struct ClipConcatEncoder {
    settings: EncodeSettings,
    codec: &'static str,
}

impl ClipConcatEncoder {
    pub fn new(settings: EncodeSettings, codec: &'static str) -> Self {
        Self { settings, codec }
    }

    fn scratch_dir(out_path: &Path) -> PathBuf {
        let stem = out_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_owned());
        out_path.with_file_name(format!(".{stem}.clips"))
    }

    /// Normalize `frame` to the canonical size and encode it as a clip of `hold` frames.
    fn encode_clip(
        &self,
        frame: &ComposedFrame,
        size: FrameSize,
        hold: u64,
        scratch: &Path,
        index: usize,
    ) -> Result<String, EncodeError> {
        let still = scratch.join(format!("still-{index:04}.png"));
        let mut rgba = load_canonical(&frame.path, size)?.into_raw();
        premultiply_rgba8_in_place(&mut rgba);
        let mut opaque = vec![0u8; rgba.len()];
        flatten_premul_over_bg_to_opaque_rgba8(&mut opaque, &rgba, self.settings.bg_rgba)?;
        image::save_buffer_with_format(
            &still,
            &opaque,
            size.width,
            size.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| EncodeError::backend(format!("failed to write '{}': {e}", still.display())))?;

        let clip_name = format!("clip-{index:04}.mp4");
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error", "-loop", "1"]);
        push_fps(&mut cmd, "-framerate", self.settings.fps);
        cmd.arg("-i").arg(&still);
        cmd.args(["-frames:v", &hold.to_string()]);
        push_output_codec(&mut cmd, self.codec);
        push_fps(&mut cmd, "-r", self.settings.fps);
        cmd.arg(scratch.join(&clip_name));
        run_to_completion(cmd)?;
        Ok(clip_name)
    }

    fn run(
        &self,
        frames: &[ComposedFrame],
        out_path: &Path,
        scratch: &Path,
        size: FrameSize,
        progress: &mut dyn FnMut(f64),
    ) -> Result<u64, EncodeError> {
        std::fs::create_dir_all(scratch).map_err(|e| {
            EncodeError::backend(format!(
                "failed to create scratch directory '{}': {e}",
                scratch.display()
            ))
        })?;

        let steps = (frames.len() + 1) as f64;
        let mut list = String::new();
        let mut written = 0u64;
        for (i, frame) in frames.iter().enumerate() {
            let hold = self.settings.fps.hold_frames(frame.duration_s);
            let clip = self.encode_clip(frame, size, hold, scratch, i)?;
            list.push_str(&format!("file '{clip}'\n"));
            written += hold;
            progress((i + 1) as f64 / steps);
        }

        // Relative entries resolve against the list file's directory.
        let list_path = scratch.join(LIST_FILE);
        std::fs::write(&list_path, list).map_err(|e| {
            EncodeError::backend(format!("failed to write '{}': {e}", list_path.display()))
        })?;

        let mut cmd = Command::new("ffmpeg");
        cmd.arg(if self.settings.overwrite { "-y" } else { "-n" });
        cmd.args(["-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .args(["-c", "copy", "-movflags", "+faststart"])
            .arg(out_path);
        run_to_completion(cmd)?;
        Ok(written)
    }
}

impl VideoEncoder for ClipConcatEncoder {
    fn strategy(&self) -> EncodeStrategy {
        EncodeStrategy::ClipConcat
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

        let scratch = Self::scratch_dir(out_path);
        let result = self.run(frames, out_path, &scratch, size, progress);
        if let Err(e) = std::fs::remove_dir_all(&scratch) {
            tracing::warn!(dir = %scratch.display(), error = %e, "failed to remove clip scratch directory");
        }
        let written = result?;
        progress(1.0);

        let video = EncodedVideo {
            path: out_path.to_path_buf(),
            size,
            fps: self.settings.fps,
            duration_s: self.settings.fps.frames_to_secs(written),
            frames: written,
            codec: self.codec.to_owned(),
            strategy: EncodeStrategy::ClipConcat,
        };
        tracing::info!(path = %out_path.display(), duration_s = video.duration_s, "video encoded");
        Ok(video)
    }
}
