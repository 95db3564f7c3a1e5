use std::borrow::Cow;
use std::collections::HashMap;

use crate::assets::font::{FontAsset, load_font_bytes};
use crate::foundation::error::{ReelError, ReelResult};
use crate::text::builtin;

/// A glyph positioned relative to the top-left of its line box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// One shaped line of text.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ShapedLine {
    pub(crate) width: f32,
    pub(crate) glyphs: Vec<PositionedGlyph>,
}

/// Font data the composer needs to draw a layout.
#[derive(Clone)]
pub enum FaceHandle {
    Builtin,
    Outline(vello_cpu::peniko::FontData),
}

impl FaceHandle {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }
}

impl std::fmt::Debug for FaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => f.write_str("Builtin"),
            Self::Outline(_) => f.write_str("Outline"),
        }
    }
}

/// Shaping state for an outline font, built on Parley contexts.
struct OutlineFace {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    line_heights: HashMap<u32, f32>,
}

impl OutlineFace {
    fn from_bytes(font_bytes: Vec<u8>) -> ReelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ReelError::validation("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
            line_heights: HashMap::new(),
        })
    }

    fn build(&mut self, text: &str, size_px: f32) -> parley::Layout<()> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    fn shape(&mut self, text: &str, size_px: f32) -> ShapedLine {
        let layout = self.build(text, size_px);
        let mut glyphs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| PositionedGlyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
            }
        }
        ShapedLine {
            width: layout.width(),
            glyphs,
        }
    }

    fn line_height(&mut self, size_px: f32) -> f32 {
        let key = size_px.to_bits();
        if let Some(h) = self.line_heights.get(&key) {
            return *h;
        }
        let h = self.build("Hg", size_px).height();
        self.line_heights.insert(key, h);
        h
    }
}

/// The face bound to one run: an outline font or the built-in bitmap face.
pub struct TextFace {
    outline: Option<OutlineFace>,
}

impl TextFace {
    pub fn builtin() -> Self {
        Self { outline: None }
    }

    /// Load the font behind `asset`.
    pub fn load(asset: &FontAsset) -> ReelResult<Self> {
        match asset {
            FontAsset::Builtin => Ok(Self::builtin()),
            FontAsset::File(path) => {
                let bytes = load_font_bytes(path)?;
                let outline =
                    OutlineFace::from_bytes(bytes).map_err(|e| ReelError::asset(path, e))?;
                Ok(Self {
                    outline: Some(outline),
                })
            }
        }
    }

    /// Load `asset`, degrading to the built-in face when it cannot be used.
    pub fn load_or_builtin(asset: &FontAsset) -> Self {
        match Self::load(asset) {
            Ok(face) => face,
            Err(e) => {
                tracing::warn!(error = %e, "font failed to load, using built-in face for this run");
                Self::builtin()
            }
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.outline.is_none()
    }

    pub fn family_name(&self) -> Option<&str> {
        self.outline.as_ref().map(|o| o.family_name.as_str())
    }

    pub(crate) fn handle(&self) -> FaceHandle {
        match &self.outline {
            Some(o) => FaceHandle::Outline(o.font.clone()),
            None => FaceHandle::Builtin,
        }
    }

    pub(crate) fn advance(&mut self, text: &str, size_px: f32) -> f32 {
        match self.outline.as_mut() {
            Some(o) => o.build(text, size_px).width(),
            None => builtin::advance(text, size_px),
        }
    }

    pub(crate) fn line_height(&mut self, size_px: f32) -> f32 {
        match self.outline.as_mut() {
            Some(o) => o.line_height(size_px),
            None => builtin::line_height(size_px),
        }
    }

    pub(crate) fn shape(&mut self, text: &str, size_px: f32) -> ShapedLine {
        match self.outline.as_mut() {
            Some(o) => o.shape(text, size_px),
            None => ShapedLine {
                width: builtin::advance(text, size_px),
                glyphs: Vec::new(),
            },
        }
    }
}
