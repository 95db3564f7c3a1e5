//! Burns a laid-out text block into a copy of a base image.

use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::assets::image::ImageAsset;
use crate::foundation::core::{FrameSize, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::text::builtin;
use crate::text::face::FaceHandle;
use crate::text::layout::{LayoutLine, LayoutResult};

/// Colors used when drawing the text block.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PanelStyle {
    /// Semi-opaque panel behind the text.
    pub panel_rgba: Rgba8,
    pub text_rgba: Rgba8,
    /// JPEG quality for composed frames written as JPEG.
    pub jpeg_quality: u8,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            panel_rgba: Rgba8::new(0, 0, 0, 160),
            text_rgba: Rgba8::WHITE,
            jpeg_quality: 92,
        }
    }
}

/// An image with text burned in, and how long it stays on screen.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComposedFrame {
    /// Position in the work list.
    pub item: usize,
    pub path: PathBuf,
    /// The untouched base image.
    pub source: PathBuf,
    pub size: FrameSize,
    pub duration_s: f64,
}

impl ComposedFrame {
    pub fn with_duration(mut self, duration_s: f64) -> Self {
        self.duration_s = duration_s;
        self
    }

    pub fn for_item(mut self, item: usize) -> Self {
        self.item = item;
        self
    }
}

/// Writes composed frames into one scratch directory, numbering them in call order.
pub struct ImageComposer {
    out_dir: PathBuf,
    style: PanelStyle,
    next_seq: u32,
    ctx: Option<vello_cpu::RenderContext>,
}

impl ImageComposer {
    pub fn new(out_dir: impl Into<PathBuf>, style: PanelStyle) -> ReelResult<Self> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir).with_context(|| {
            format!("failed to create frame directory '{}'", out_dir.display())
        })?;
        Ok(Self {
            out_dir,
            style,
            next_seq: 0,
            ctx: None,
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Compose `layout` onto a copy of `image`. The returned frame has no duration yet.
    #[tracing::instrument(skip(self, layout), fields(src = %image.path().display()))]
    pub fn compose(
        &mut self,
        image: &ImageAsset,
        layout: &LayoutResult,
    ) -> ReelResult<ComposedFrame> {
        let base = image.decode_rgba8()?;
        let size = FrameSize::new(base.width(), base.height());
        if size != layout.frame {
            tracing::debug!(?size, layout = ?layout.frame, "layout computed for a different size");
        }

        let out = if layout.is_empty() {
            base
        } else {
            self.render(base, layout)
                .map_err(|e| ReelError::asset(image.path(), e))?
        };

        let (format, ext) = output_format(image);
        self.next_seq += 1;
        let path = self
            .out_dir
            .join(format!("frame-{:04}.{ext}", self.next_seq));
        self.write(&out, format, &path)?;

        Ok(ComposedFrame {
            item: 0,
            path,
            source: image.path().to_path_buf(),
            size,
            duration_s: 0.0,
        })
    }

    fn render(&mut self, base: image::RgbaImage, layout: &LayoutResult) -> ReelResult<image::RgbaImage> {
        let (width, height) = base.dimensions();
        let w: u16 = width
            .try_into()
            .map_err(|_| ReelError::validation("image width exceeds 65535"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| ReelError::validation("image height exceeds 65535"))?;

        let mut premul = base.into_raw();
        premultiply_rgba8_in_place(&mut premul);
        let base_paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap_from_premul_bytes(
                &premul, w, h,
            )?)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let full = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(width), f64::from(height));
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(base_paint);
        ctx.fill_rect(&full);

        if let Some(panel) = layout.panel {
            ctx.set_paint(self.style.panel_rgba.to_cpu_color());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                panel.x0, panel.y0, panel.x1, panel.y1,
            ));
        }

        for line in &layout.lines {
            draw_line(&mut ctx, line, layout, self.style.text_rgba);
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        let mut rgba = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut rgba);
        image::RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| ReelError::validation("rendered buffer does not match frame size"))
    }

    fn write(&self, img: &image::RgbaImage, format: image::ImageFormat, path: &Path) -> ReelResult<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        match format {
            image::ImageFormat::Jpeg => {
                let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut writer,
                    self.style.jpeg_quality,
                );
                rgb.write_with_encoder(encoder)
            }
            other => img.write_to(&mut writer, other),
        }
        .with_context(|| format!("failed to write composed frame '{}'", path.display()))?;
        Ok(())
    }
}

fn draw_line(
    ctx: &mut vello_cpu::RenderContext,
    line: &LayoutLine,
    layout: &LayoutResult,
    color: Rgba8,
) {
    ctx.set_paint(color.to_cpu_color());
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        line.origin.x,
        line.origin.y,
    )));
    match &layout.face {
        FaceHandle::Outline(font) => {
            let glyphs = line.glyphs.iter().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(layout.font_size_px)
                .fill_glyphs(glyphs);
        }
        FaceHandle::Builtin => {
            builtin::for_each_run(&line.text, layout.font_size_px, |r| {
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
            });
        }
    }
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

/// Same raster format as the source where we can encode it, PNG otherwise.
fn output_format(image: &ImageAsset) -> (image::ImageFormat, &'static str) {
    match image.format() {
        Some(image::ImageFormat::Jpeg) => (image::ImageFormat::Jpeg, "jpg"),
        Some(image::ImageFormat::Bmp) => (image::ImageFormat::Bmp, "bmp"),
        Some(image::ImageFormat::Tiff) => (image::ImageFormat::Tiff, "tiff"),
        _ => (image::ImageFormat::Png, "png"),
    }
}

fn pixmap_from_premul_bytes(bytes: &[u8], w: u16, h: u16) -> ReelResult<vello_cpu::Pixmap> {
    if bytes.len() != usize::from(w) * usize::from(h) * 4 {
        return Err(ReelError::validation("pixmap byte len mismatch"));
    }
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composer.rs"]
mod tests;
