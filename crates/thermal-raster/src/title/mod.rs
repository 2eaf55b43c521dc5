//! Title rendering for ticket headers.
//!
//! A named font is measured as a vector outline, shrunk to fit the paper
//! and centered before it is filled. The default font is drawn with the
//! painter's own text layout at the requested size.

pub mod canvas;
pub mod layout;
pub mod outline;

use tracing::debug;

use crate::bitmap::Bitmap;
use crate::color::Color;
use crate::font::{FontKey, FontStrategy, FontSupply, OutlineProvider, TextPainter};
use crate::profile::PrinterProfile;
use crate::{RasterError, Result};

pub use layout::{MAX_CANVAS_HEIGHT, NamedLayout};
pub use outline::{BoundingBox, GlyphPath, PathCommand, Point};

/// Default title font size in pixels.
pub const DEFAULT_FONT_SIZE: u32 = 64;

/// Default padding around the title in pixels.
pub const DEFAULT_PADDING: u32 = 12;

/// Per-call title rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub font_key: FontKey,
    pub font_size_px: u32,
    pub padding_px: u32,
    pub background: Color,
    pub foreground: Color,
    /// Crop the rendered title to its top rows.
    pub max_height_px: Option<u32>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font_key: FontKey::Default,
            font_size_px: DEFAULT_FONT_SIZE,
            padding_px: DEFAULT_PADDING,
            background: Color::WHITE,
            foreground: Color::BLACK,
            max_height_px: None,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the font key.
    pub fn with_font(mut self, key: FontKey) -> Self {
        self.font_key = key;
        self
    }

    /// Builder: set the font size.
    pub fn with_font_size(mut self, px: u32) -> Self {
        self.font_size_px = px;
        self
    }

    /// Builder: set the padding.
    pub fn with_padding(mut self, px: u32) -> Self {
        self.padding_px = px;
        self
    }

    /// Builder: set background and foreground colors.
    pub fn with_colors(mut self, background: Color, foreground: Color) -> Self {
        self.background = background;
        self.foreground = foreground;
        self
    }

    /// Builder: set the height cap.
    pub fn with_max_height(mut self, px: Option<u32>) -> Self {
        self.max_height_px = px;
        self
    }
}

/// Renders title text into luminance bitmaps as wide as the paper.
#[derive(Debug, Clone, Copy)]
pub struct TitleRasterizer {
    profile: PrinterProfile,
}

impl TitleRasterizer {
    pub fn new(profile: PrinterProfile) -> Self {
        Self { profile }
    }

    /// Render `text`, loading the font named by `options.font_key`.
    ///
    /// Blank text yields an empty bitmap without touching the font supply.
    /// An unknown font key is an error, not a fallback.
    pub fn render_title(
        &self,
        text: &str,
        options: &RenderOptions,
        fonts: &dyn FontSupply,
    ) -> Result<Bitmap> {
        if text.trim().is_empty() {
            return Ok(Bitmap::empty());
        }
        let strategy = fonts.load_font(&options.font_key)?;
        self.render_with(text, options, &strategy)
    }

    /// Render `text` with an already loaded font.
    pub fn render_with(
        &self,
        text: &str,
        options: &RenderOptions,
        strategy: &FontStrategy,
    ) -> Result<Bitmap> {
        if text.trim().is_empty() {
            return Ok(Bitmap::empty());
        }
        let bitmap = match strategy {
            FontStrategy::Named(provider) => self.render_outline(text, options, provider.as_ref())?,
            FontStrategy::Default(painter) => self.render_native(text, options, painter.as_ref())?,
        };
        Ok(canvas::crop_top(bitmap, options.max_height_px))
    }

    /// Measure `text` and compute where its outline goes.
    pub fn named_layout(
        &self,
        path: &GlyphPath,
        options: &RenderOptions,
        provider: &dyn OutlineProvider,
    ) -> NamedLayout {
        NamedLayout::compute(
            self.profile.dot_width(),
            options.padding_px,
            options.font_size_px as f32,
            &path.bounding_box(),
            &provider.metrics(),
        )
    }

    fn render_outline(
        &self,
        text: &str,
        options: &RenderOptions,
        provider: &dyn OutlineProvider,
    ) -> Result<Bitmap> {
        let raw = provider.glyph_path(text, options.font_size_px as f32);
        let layout = self.named_layout(&raw, options, provider);
        debug!(
            scale = layout.scale,
            tx = layout.tx,
            baseline_y = layout.baseline_y,
            width = layout.width,
            height = layout.height,
            "Rendering outline title"
        );

        check_canvas(layout.width, layout.height)?;

        let placed = raw.transformed(layout.scale, layout.tx, layout.baseline_y);
        canvas::fill_path(
            &placed,
            layout.width,
            layout.height,
            options.background,
            options.foreground,
        )
    }

    fn render_native(
        &self,
        text: &str,
        options: &RenderOptions,
        painter: &dyn TextPainter,
    ) -> Result<Bitmap> {
        let width = self.profile.dot_width();
        let height = layout::default_height(options.padding_px, options.font_size_px);
        check_canvas(width, height)?;
        let size = options.font_size_px as f32;

        let (text_w, line_h) = painter.measure(text, size);
        let (x, y) = layout::centered_origin(width, height, text_w, line_h);
        debug!(width, height, text_w, line_h, "Rendering default-font title");

        let mut img = image::RgbaImage::from_pixel(width, height, options.background.to_rgba());
        painter.draw(&mut img, x, y, size, text, options.foreground.to_rgba());
        Ok(canvas::to_luma(img))
    }
}

fn check_canvas(width: u32, height: u32) -> Result<()> {
    if height > MAX_CANVAS_HEIGHT {
        return Err(RasterError::Canvas { width, height });
    }
    Ok(())
}
