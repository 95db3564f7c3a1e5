//! JSON-loadable pipeline configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::compose::PanelStyle;
use crate::encode::EncodeSettings;
use crate::foundation::error::{ReelError, ReelResult};
use crate::text::LayoutConfig;

/// How long each composed frame stays on screen.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DurationPolicy {
    /// Every frame gets the same duration.
    Uniform { seconds: f64 },
    /// `base + per_char * chars`, clamped to `[min, max]`.
    ByTextLength {
        base_seconds: f64,
        per_char_seconds: f64,
        min_seconds: f64,
        max_seconds: f64,
    },
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self::Uniform { seconds: 3.0 }
    }
}

impl DurationPolicy {
    pub fn seconds_for(&self, text: &str) -> f64 {
        match *self {
            Self::Uniform { seconds } => seconds,
            Self::ByTextLength {
                base_seconds,
                per_char_seconds,
                min_seconds,
                max_seconds,
            } => {
                let chars = text.chars().filter(|c| !c.is_whitespace()).count() as f64;
                (base_seconds + per_char_seconds * chars).clamp(min_seconds, max_seconds)
            }
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ReelError::validation(format!(
                    "duration {name} must be > 0, got {v}"
                )))
            }
        };
        match *self {
            Self::Uniform { seconds } => positive("seconds", seconds),
            Self::ByTextLength {
                base_seconds,
                per_char_seconds,
                min_seconds,
                max_seconds,
            } => {
                if !(base_seconds.is_finite() && base_seconds >= 0.0)
                    || !(per_char_seconds.is_finite() && per_char_seconds >= 0.0)
                {
                    return Err(ReelError::validation(
                        "duration base_seconds and per_char_seconds must be >= 0",
                    ));
                }
                positive("min_seconds", min_seconds)?;
                positive("max_seconds", max_seconds)?;
                if min_seconds > max_seconds {
                    return Err(ReelError::validation(
                        "duration min_seconds must not exceed max_seconds",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Everything a [`crate::Pipeline`] needs besides its input.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub layout: LayoutConfig,
    pub style: PanelStyle,
    pub encode: EncodeSettings,
    pub duration: DurationPolicy,
    /// Root for per-run output directories. Defaults to `$TMPDIR/reelcraft`.
    pub output_dir: Option<PathBuf>,
    /// Where the fallback font is cached. Defaults to `<output root>/fonts`.
    pub font_cache_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse pipeline config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open pipeline config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> ReelResult<()> {
        self.layout.validate()?;
        self.encode.validate()?;
        self.duration.validate()
    }

    pub fn output_root(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("reelcraft"))
    }

    pub fn font_cache_dir(&self) -> PathBuf {
        self.font_cache_dir
            .clone()
            .unwrap_or_else(|| self.output_root().join("fonts"))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
