use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::assets::font::{FontAsset, FontResolver};
use crate::compose::{ComposedFrame, ImageComposer};
use crate::config::PipelineConfig;
use crate::encode::{BackendCaps, EncodeStrategy, VideoEncoder, probe_backend, select_encoder};
use crate::foundation::error::{EncodeFailure, ReelError, ReelResult};
use crate::foundation::math::Fnv1a64;
use crate::pipeline::input::PipelineInput;
use crate::pipeline::progress::ProgressTracker;
use crate::pipeline::project::{SkippedItem, VideoProject};
use crate::sequence::{TextSegment, WorkItem, pair};
use crate::text::TextLayoutEngine;
use crate::text::builtin;

const COMPOSE_END: f64 = 0.5;
const SLUG_MAX_LEN: usize = 48;

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Turns texts and images into composed frames and, when possible, a video.
pub struct Pipeline {
    cfg: PipelineConfig,
    fonts: FontResolver,
    caps: Option<BackendCaps>,
    encoder: Box<dyn VideoEncoder>,
}

impl Pipeline {
    /// Build a pipeline, probing the local `ffmpeg` once to pick the encoder.
    pub fn new(cfg: PipelineConfig) -> ReelResult<Self> {
        cfg.validate()?;
        let caps = probe_backend();
        let encoder = select_encoder(&cfg.encode, &caps);
        tracing::info!(
            ffmpeg = caps.ffmpeg,
            codec = caps.video_codec(),
            strategy = %encoder.strategy(),
            "pipeline ready"
        );
        Ok(Self {
            fonts: FontResolver::new(cfg.font_cache_dir()),
            cfg,
            caps: Some(caps),
            encoder,
        })
    }

    /// Build a pipeline around a specific encoder, skipping backend probing.
    pub fn with_encoder(cfg: PipelineConfig, encoder: Box<dyn VideoEncoder>) -> ReelResult<Self> {
        cfg.validate()?;
        Ok(Self {
            fonts: FontResolver::new(cfg.font_cache_dir()),
            cfg,
            caps: None,
            encoder,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Capabilities found at construction. `None` when the encoder was supplied directly.
    pub fn backend(&self) -> Option<&BackendCaps> {
        self.caps.as_ref()
    }

    pub fn encoder_strategy(&self) -> EncodeStrategy {
        self.encoder.strategy()
    }

    /// Run the whole pipeline.
    ///
    /// Only input and configuration problems are errors. Items that fail to compose are
    /// recorded in [`VideoProject::skipped`], and an encoding failure leaves `video` unset.
    #[tracing::instrument(skip(self, input, progress), fields(texts = input.texts.len(), images = input.images.len()))]
    pub fn run(
        &mut self,
        input: &PipelineInput,
        progress: &mut dyn FnMut(f64),
    ) -> ReelResult<VideoProject> {
        if input.texts.is_empty() {
            return Err(ReelError::input("no text segments to compose"));
        }
        if input.images.is_empty() {
            return Err(ReelError::input("no images to compose onto"));
        }

        let mut tracker = ProgressTracker::new(progress);
        tracker.report(0.0);

        let title = input.effective_title();
        let run_dir = self.cfg.output_root().join(run_id(&title));
        let font = self.fonts.resolve(input.font_path());
        let mut engine = TextLayoutEngine::from_font(&font, self.cfg.layout);
        if engine.face().is_builtin() {
            tracing::info!("rendering this run with the built-in face");
        }

        let items = pair(&TextSegment::from_texts(&input.texts), &input.images);
        let mut composer = ImageComposer::new(run_dir.join("frames"), self.cfg.style)
            .map_err(|e| ReelError::validation(format!("output directory is unusable: {e:#}")))?;
        let mut frames = Vec::with_capacity(items.len());
        let mut skipped = Vec::new();
        for (i, item) in items.iter().enumerate() {
            match compose_item(&mut engine, &mut composer, item) {
                Ok(frame) => {
                    let duration = self.cfg.duration.seconds_for(&item.text.text);
                    frames.push(frame.for_item(item.index).with_duration(duration));
                }
                Err(e) => {
                    tracing::warn!(item = item.index, error = %e, "skipping work item");
                    skipped.push(SkippedItem {
                        item: item.index,
                        image: item.image.path().to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
            tracker.stage(0.0, COMPOSE_END, (i + 1) as f64 / items.len() as f64);
        }

        if frames.is_empty() {
            if let Err(e) = std::fs::remove_dir_all(&run_dir) {
                tracing::debug!(dir = %run_dir.display(), error = %e, "failed to clean up run directory");
            }
            return Err(ReelError::input(format!(
                "no usable frames: all {} work items failed",
                items.len()
            )));
        }
        tracing::info!(frames = frames.len(), skipped = skipped.len(), "frames composed");

        let video_path = run_dir.join(format!("{}.mp4", slug(&title)));
        let (video, encode_failure) = {
            let mut stage = |p: f64| tracker.stage(COMPOSE_END, 1.0, p);
            match self.encoder.encode(&frames, &video_path, &mut stage) {
                Ok(video) => (Some(video), None),
                Err(e) => {
                    let failure = EncodeFailure::from(&e);
                    tracing::warn!(
                        kind = ?failure.kind,
                        error = %e,
                        "video encoding failed; keeping composed frames"
                    );
                    remove_partial(&video_path);
                    (None, Some(failure))
                }
            }
        };
        tracker.finish();

        Ok(VideoProject {
            title,
            source_ref: input.source_ref.clone(),
            texts: input.texts.clone(),
            images: input.images.iter().map(|i| i.path().to_path_buf()).collect(),
            output_dir: run_dir,
            font: font_for_project(font, &engine),
            frames,
            skipped,
            video,
            encode_failure,
        })
    }
}

fn compose_item(
    engine: &mut TextLayoutEngine,
    composer: &mut ImageComposer,
    item: &WorkItem,
) -> ReelResult<ComposedFrame> {
    let size = item.image.dimensions()?;
    let layout = engine.layout(&item.text.text, size.width, size.height)?;
    if layout.overflow {
        tracing::debug!(item = item.index, "text overflows at the minimum font size");
    }
    composer.compose(&item.image, &layout)
}

/// The font actually used: a file that failed to load means the built-in face drew the run.
fn font_for_project(resolved: FontAsset, engine: &TextLayoutEngine) -> FontAsset {
    if engine.face().is_builtin() {
        FontAsset::Builtin
    } else {
        resolved
    }
}

fn remove_partial(path: &Path) {
    if path.is_file()
        && let Err(e) = std::fs::remove_file(path)
    {
        tracing::debug!(path = %path.display(), error = %e, "failed to remove partial video");
    }
}

/// Unique per-run directory name: the title slug plus a short hash.
fn run_id(title: &str) -> String {
    let mut h = Fnv1a64::new_default();
    h.write_str(title);
    h.write_u64(u64::from(std::process::id()));
    h.write_u64(RUN_COUNTER.fetch_add(1, Ordering::Relaxed));
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    h.write_u64(nanos);
    format!("{}-{:08x}", slug(title), h.finish() as u32)
}

/// File-name-safe ASCII slug; `reel` for titles with no usable characters.
pub(crate) fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len().min(SLUG_MAX_LEN));
    for c in title.chars() {
        let c = builtin::fold(c).to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if out.len() >= SLUG_MAX_LEN {
                break;
            }
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "reel".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
