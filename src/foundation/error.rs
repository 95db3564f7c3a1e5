use std::path::{Path, PathBuf};

/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Errors surfaced by the composition pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Nothing usable to work with (no texts, no images, or zero composed frames).
    #[error("input error: {0}")]
    Input(String),

    /// A specific image or font file could not be read or decoded.
    #[error("asset error: '{}': {reason}", path.display())]
    Asset {
        /// Offending file.
        path: PathBuf,
        /// Decoder or I/O message.
        reason: String,
    },

    /// Video assembly failed. Recovered by the pipeline; only seen by direct encoder callers.
    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// Configuration or argument values out of range.
    #[error("validation error: {0}")]
    Validation(String),

    /// JSON configuration or manifest errors.
    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn asset(path: impl AsRef<Path>, reason: impl std::fmt::Display) -> Self {
        Self::Asset {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Failure categories of the video backend.
///
/// `BackendMissing` points at a configuration problem (no `ffmpeg`), `BadFrame` at the data, and
/// `Backend` at the encoder process itself.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("encoding backend missing: {0}")]
    BackendMissing(String),

    #[error("encoding backend failed: {0}")]
    Backend(String),

    #[error("bad frame '{}': {reason}", path.display())]
    BadFrame { path: PathBuf, reason: String },

    #[error("no frames to encode")]
    NoFrames,
}

impl EncodeError {
    pub fn backend_missing(msg: impl Into<String>) -> Self {
        Self::BackendMissing(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn bad_frame(path: impl AsRef<Path>, reason: impl std::fmt::Display) -> Self {
        Self::BadFrame {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> EncodeFailureKind {
        match self {
            Self::BackendMissing(_) => EncodeFailureKind::BackendMissing,
            Self::Backend(_) => EncodeFailureKind::Backend,
            Self::BadFrame { .. } => EncodeFailureKind::BadFrame,
            Self::NoFrames => EncodeFailureKind::NoFrames,
        }
    }
}

/// Serializable category of an [`EncodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeFailureKind {
    BackendMissing,
    Backend,
    BadFrame,
    NoFrames,
}

impl EncodeFailureKind {
    /// Configuration problems (the operator must install or fix the toolchain).
    pub fn is_configuration(self) -> bool {
        matches!(self, Self::BackendMissing)
    }
}

/// Diagnostic record of a soft encoding failure, kept on the finished project.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EncodeFailure {
    pub kind: EncodeFailureKind,
    pub message: String,
}

impl From<&EncodeError> for EncodeFailure {
    fn from(err: &EncodeError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
