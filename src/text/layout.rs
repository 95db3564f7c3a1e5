use kurbo::{Point, Rect};

use crate::assets::font::FontAsset;
use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};
use crate::text::face::{FaceHandle, PositionedGlyph, TextFace};

/// Where the text block sits vertically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAnchor {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Sizing and wrapping knobs for [`TextLayoutEngine`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Starting font size as a fraction of the shorter frame side.
    pub start_size_ratio: f32,
    /// Font size floor; at this size text may overflow.
    pub min_font_px: f32,
    /// Multiplier applied each time the block does not fit.
    pub shrink_factor: f32,
    /// Widest a line may be, as a fraction of the frame width.
    pub max_width_ratio: f32,
    /// Tallest the block may be, as a fraction of the frame height.
    pub max_height_ratio: f32,
    /// Multiplier on the face's natural line height.
    pub line_spacing: f32,
    pub vertical_anchor: VerticalAnchor,
    /// Distance from the frame edge for `Top`/`Bottom` anchors, as a fraction of frame height.
    pub margin_ratio: f32,
    /// Panel padding around the block, as a fraction of the font size.
    pub panel_padding_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            start_size_ratio: 0.08,
            min_font_px: 12.0,
            shrink_factor: 0.9,
            max_width_ratio: 0.85,
            max_height_ratio: 0.6,
            line_spacing: 1.1,
            vertical_anchor: VerticalAnchor::Center,
            margin_ratio: 0.06,
            panel_padding_ratio: 0.4,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> ReelResult<()> {
        fn unit(name: &str, v: f32) -> ReelResult<()> {
            if !(v.is_finite() && v > 0.0 && v <= 1.0) {
                return Err(ReelError::validation(format!(
                    "layout {name} must be in (0, 1], got {v}"
                )));
            }
            Ok(())
        }
        unit("start_size_ratio", self.start_size_ratio)?;
        unit("max_width_ratio", self.max_width_ratio)?;
        unit("max_height_ratio", self.max_height_ratio)?;
        if !(self.shrink_factor.is_finite() && self.shrink_factor > 0.0 && self.shrink_factor < 1.0)
        {
            return Err(ReelError::validation(
                "layout shrink_factor must be in (0, 1)",
            ));
        }
        if !(self.min_font_px.is_finite() && self.min_font_px >= 1.0) {
            return Err(ReelError::validation("layout min_font_px must be >= 1"));
        }
        if !(self.line_spacing.is_finite() && self.line_spacing > 0.0) {
            return Err(ReelError::validation("layout line_spacing must be > 0"));
        }
        if !(self.margin_ratio.is_finite() && (0.0..0.5).contains(&self.margin_ratio)) {
            return Err(ReelError::validation("layout margin_ratio must be in [0, 0.5)"));
        }
        if !(self.panel_padding_ratio.is_finite() && self.panel_padding_ratio >= 0.0) {
            return Err(ReelError::validation(
                "layout panel_padding_ratio must be >= 0",
            ));
        }
        Ok(())
    }
}

/// One wrapped line, already positioned inside the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutLine {
    pub text: String,
    /// Top-left corner of the line box.
    pub origin: Point,
    pub width: f64,
    /// Glyphs relative to `origin`. Empty for the built-in face, which draws from `text`.
    pub glyphs: Vec<PositionedGlyph>,
}

/// A wrapped, sized and positioned text block for one frame.
#[derive(Clone, Debug)]
pub struct LayoutResult {
    pub frame: FrameSize,
    pub lines: Vec<LayoutLine>,
    pub font_size_px: f32,
    pub line_height_px: f32,
    /// Bounding box of all lines.
    pub block: Rect,
    /// Legibility panel behind the text, clipped to the frame. `None` when there is no text.
    pub panel: Option<Rect>,
    /// Set when the text still did not fit at the minimum font size.
    pub overflow: bool,
    pub face: FaceHandle,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

impl PartialEq for LayoutResult {
    fn eq(&self, other: &Self) -> bool {
        self.frame == other.frame
            && self.lines == other.lines
            && self.font_size_px == other.font_size_px
            && self.line_height_px == other.line_height_px
            && self.block == other.block
            && self.panel == other.panel
            && self.overflow == other.overflow
            && self.face.is_builtin() == other.face.is_builtin()
    }
}

/// Wraps and sizes text to fit a frame using one face for the whole run.
pub struct TextLayoutEngine {
    face: TextFace,
    cfg: LayoutConfig,
}

impl TextLayoutEngine {
    pub fn new(face: TextFace, cfg: LayoutConfig) -> Self {
        Self { face, cfg }
    }

    /// Bind `font` for a run. A font that fails to load switches the whole run to the built-in
    /// face.
    pub fn from_font(font: &FontAsset, cfg: LayoutConfig) -> Self {
        Self::new(TextFace::load_or_builtin(font), cfg)
    }

    pub fn face(&self) -> &TextFace {
        &self.face
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.cfg
    }

    /// Lay out `text` for a `frame_width` x `frame_height` frame.
    #[tracing::instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub fn layout(
        &mut self,
        text: &str,
        frame_width: u32,
        frame_height: u32,
    ) -> ReelResult<LayoutResult> {
        let frame = FrameSize::new(frame_width, frame_height);
        if frame.is_empty() {
            return Err(ReelError::validation(format!(
                "cannot lay out text in a {frame_width}x{frame_height} frame"
            )));
        }

        let paragraphs: Vec<Vec<&str>> = text
            .lines()
            .map(|p| p.split_whitespace().collect::<Vec<_>>())
            .filter(|words| !words.is_empty())
            .collect();

        let mut size = self.start_size(frame);
        if paragraphs.is_empty() {
            return Ok(LayoutResult {
                frame,
                lines: Vec::new(),
                font_size_px: size,
                line_height_px: self.line_height(size),
                block: Rect::ZERO,
                panel: None,
                overflow: false,
                face: self.face.handle(),
            });
        }

        let max_w = frame_width as f32 * self.cfg.max_width_ratio;
        let max_h = frame_height as f32 * self.cfg.max_height_ratio;

        let (wrapped, line_h, overflow) = loop {
            let wrapped = self.wrap(&paragraphs, size, max_w);
            let line_h = self.line_height(size);
            let fits = wrapped.len() as f32 * line_h <= max_h
                && wrapped.iter().all(|(_, w)| *w <= max_w);
            if fits || size <= self.cfg.min_font_px {
                break (wrapped, line_h, !fits);
            }
            size = self.next_size(size);
        };

        if overflow {
            tracing::debug!(size, "text overflows the frame at the minimum font size");
        }

        Ok(self.position(frame, wrapped, size, line_h, overflow))
    }

    fn start_size(&self, frame: FrameSize) -> f32 {
        (frame.min_side() as f32 * self.cfg.start_size_ratio)
            .floor()
            .max(self.cfg.min_font_px)
    }

    /// Next smaller size; strictly decreasing and never below the floor.
    fn next_size(&self, size: f32) -> f32 {
        let mut next = (size * self.cfg.shrink_factor).floor();
        if next >= size {
            next = size - 1.0;
        }
        next.max(self.cfg.min_font_px)
    }

    fn line_height(&mut self, size: f32) -> f32 {
        self.face.line_height(size) * self.cfg.line_spacing
    }

    /// Greedy word wrap. A word wider than `max_w` gets a line of its own.
    fn wrap(&mut self, paragraphs: &[Vec<&str>], size: f32, max_w: f32) -> Vec<(String, f32)> {
        let mut lines = Vec::new();
        for words in paragraphs {
            let mut current = String::new();
            let mut current_w = 0.0;
            for word in words {
                if current.is_empty() {
                    current.push_str(word);
                    current_w = self.face.advance(&current, size);
                    continue;
                }
                let candidate = format!("{current} {word}");
                let candidate_w = self.face.advance(&candidate, size);
                if candidate_w <= max_w {
                    current = candidate;
                    current_w = candidate_w;
                } else {
                    lines.push((std::mem::take(&mut current), current_w));
                    current.push_str(word);
                    current_w = self.face.advance(&current, size);
                }
            }
            if !current.is_empty() {
                lines.push((current, current_w));
            }
        }
        lines
    }

    fn position(
        &mut self,
        frame: FrameSize,
        wrapped: Vec<(String, f32)>,
        size: f32,
        line_h: f32,
        overflow: bool,
    ) -> LayoutResult {
        let fw = f64::from(frame.width);
        let fh = f64::from(frame.height);
        let lh = f64::from(line_h);
        let block_h = wrapped.len() as f64 * lh;
        let block_w = wrapped
            .iter()
            .map(|(_, w)| f64::from(*w))
            .fold(0.0, f64::max);

        let margin = fh * f64::from(self.cfg.margin_ratio);
        let top = match self.cfg.vertical_anchor {
            VerticalAnchor::Top => margin,
            VerticalAnchor::Center => (fh - block_h) / 2.0,
            VerticalAnchor::Bottom => fh - margin - block_h,
        };

        // Extra leading from `line_spacing` is split above and below each line.
        let natural_h = f64::from(self.face.line_height(size));
        let leading = (lh - natural_h) / 2.0;

        let lines: Vec<LayoutLine> = wrapped
            .into_iter()
            .enumerate()
            .map(|(i, (text, _))| {
                let shaped = self.face.shape(&text, size);
                let width = f64::from(shaped.width);
                LayoutLine {
                    origin: Point::new((fw - width) / 2.0, top + i as f64 * lh + leading),
                    width,
                    glyphs: shaped.glyphs,
                    text,
                }
            })
            .collect();

        let block = Rect::new((fw - block_w) / 2.0, top, (fw + block_w) / 2.0, top + block_h);
        let pad = f64::from(size * self.cfg.panel_padding_ratio);
        let panel = block
            .inflate(pad, pad)
            .intersect(Rect::new(0.0, 0.0, fw, fh));

        LayoutResult {
            frame,
            lines,
            font_size_px: size,
            line_height_px: line_h,
            block,
            panel: (panel.area() > 0.0).then_some(panel),
            overflow,
            face: self.face.handle(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
