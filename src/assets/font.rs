use std::path::{Path, PathBuf};

use anyhow::Context as _;
use usvg::fontdb;

use crate::foundation::error::{ReelError, ReelResult};

/// File name of the materialized fallback font inside the resolver cache directory.
pub const FALLBACK_FONT_FILE: &str = "fallback-font.ttf";

/// System families tried, in order, when no preferred font is usable.
const FALLBACK_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Open Sans",
    "Arial",
    "Helvetica",
];

/// Font used for every frame of one run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontAsset {
    /// A font file on disk that parses as at least one face.
    File(PathBuf),
    /// The built-in bitmap face; needs no file.
    Builtin,
}

impl FontAsset {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(p) => Some(p),
            Self::Builtin => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }
}

/// Finds a usable font: the caller's choice, a cached system fallback, or the built-in face.
#[derive(Clone, Debug)]
pub struct FontResolver {
    cache_dir: PathBuf,
}

impl FontResolver {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn fallback_path(&self) -> PathBuf {
        self.cache_dir.join(FALLBACK_FONT_FILE)
    }

    /// Resolve a font. Never fails: every unusable candidate is logged and skipped, and the
    /// built-in face is the last resort.
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, preferred: Option<&Path>) -> FontAsset {
        if let Some(path) = preferred {
            match load_font_bytes(path) {
                Ok(_) => return FontAsset::File(path.to_path_buf()),
                Err(e) => tracing::warn!(error = %e, "preferred font unusable, falling back"),
            }
        }

        let cached = self.fallback_path();
        if cached.is_file() {
            match load_font_bytes(&cached) {
                Ok(_) => return FontAsset::File(cached),
                Err(e) => tracing::warn!(error = %e, "cached fallback font is corrupt, replacing"),
            }
        }

        match self.materialize_system_fallback() {
            Ok(path) => FontAsset::File(path),
            Err(e) => {
                tracing::warn!(error = %e, "no system font available, using built-in face");
                FontAsset::Builtin
            }
        }
    }

    /// Copy a system sans-serif face into the cache directory. Reuses the file when present.
    fn materialize_system_fallback(&self) -> ReelResult<PathBuf> {
        let target = self.fallback_path();
        if target.is_file() && load_font_bytes(&target).is_ok() {
            return Ok(target);
        }

        let bytes = system_fallback_bytes()?;
        std::fs::create_dir_all(&self.cache_dir).with_context(|| {
            format!(
                "failed to create font cache directory '{}'",
                self.cache_dir.display()
            )
        })?;

        // Write next to the target and rename so a half-written file is never picked up.
        let tmp = self.cache_dir.join(format!("{FALLBACK_FONT_FILE}.part"));
        std::fs::write(&tmp, &bytes)
            .with_context(|| format!("failed to write '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &target)
            .with_context(|| format!("failed to move font into '{}'", target.display()))?;

        tracing::info!(path = %target.display(), "materialized fallback font");
        Ok(target)
    }
}

/// Read a font file and check that it holds at least one parseable face.
pub fn load_font_bytes(path: &Path) -> ReelResult<Vec<u8>> {
    let bytes = std::fs::read(path).map_err(|e| ReelError::asset(path, e))?;
    if face_count(&bytes) == 0 {
        return Err(ReelError::asset(path, "no font faces found in file"));
    }
    Ok(bytes)
}

fn face_count(bytes: &[u8]) -> usize {
    let mut db = fontdb::Database::new();
    db.load_font_data(bytes.to_vec());
    db.len()
}

fn system_fallback_bytes() -> ReelResult<Vec<u8>> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    if db.len() == 0 {
        return Err(ReelError::asset(
            "<system fonts>",
            "no system fonts are installed",
        ));
    }

    let mut families: Vec<fontdb::Family<'_>> = FALLBACK_FAMILIES
        .iter()
        .map(|name| fontdb::Family::Name(*name))
        .collect();
    families.push(fontdb::Family::SansSerif);

    let query = fontdb::Query {
        families: &families,
        ..fontdb::Query::default()
    };
    let id = db
        .query(&query)
        .or_else(|| db.faces().find(|f| f.index == 0).map(|f| f.id))
        .ok_or_else(|| ReelError::asset("<system fonts>", "no usable system face"))?;

    db.with_face_data(id, |data, _index| data.to_vec())
        .ok_or_else(|| ReelError::asset("<system fonts>", "failed to read system face data"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
