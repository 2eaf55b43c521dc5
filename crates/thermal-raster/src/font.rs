//! Font capabilities consumed by the title rasterizer.
//!
//! A [`FontSupply`] turns a [`FontKey`] into a [`FontStrategy`]: either a
//! text painter for the default face or an outline provider for a named
//! face. [`OutlineFont`] backs both from TTF/OTF bytes.

use std::fmt;
use std::sync::Arc;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use ttf_parser::{Face, GlyphId};

use crate::title::outline::{GlyphPath, GlyphPathBuilder};
use crate::{RasterError, Result};

/// Key used to pick the title font.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FontKey {
    #[default]
    Default,
    Named(String),
}

impl FontKey {
    /// Parse a user-supplied key. Empty and `"default"` select the default
    /// face; anything else is a lowercase named key.
    pub fn parse(value: &str) -> Self {
        let key = value.trim().to_lowercase();
        if key.is_empty() || key == "default" {
            Self::Default
        } else {
            Self::Named(key)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vertical metrics in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
}

impl FontMetrics {
    fn px(&self, units: i16, size_px: f32) -> f32 {
        let upem = if self.units_per_em == 0 { 1000 } else { self.units_per_em };
        f32::from(units).abs() / f32::from(upem) * size_px
    }

    /// Height above the baseline at `size_px`.
    pub fn ascent_px(&self, size_px: f32) -> f32 {
        self.px(self.ascender, size_px)
    }

    /// Depth below the baseline at `size_px`, as a positive number.
    pub fn descent_px(&self, size_px: f32) -> f32 {
        self.px(self.descender, size_px)
    }
}

/// Glyph outlines and metrics for a named title font.
///
/// Implementations are loaded once and shared read-only between
/// concurrent renders.
pub trait OutlineProvider: Send + Sync {
    fn metrics(&self) -> FontMetrics;

    /// Outline of `text` laid out on one line at `size_px`, with the pen
    /// starting at the origin and the baseline at `y = 0` (y grows down).
    fn glyph_path(&self, text: &str, size_px: f32) -> GlyphPath;
}

/// Native text drawing used for the default title face.
pub trait TextPainter: Send + Sync {
    /// Advance width and line height of `text` at `size_px`.
    fn measure(&self, text: &str, size_px: f32) -> (u32, u32);

    /// Draw `text` with the top of its line box at `(x, y)`.
    fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, size_px: f32, text: &str, color: Rgba<u8>);
}

/// Font selected for one title render.
#[derive(Clone)]
pub enum FontStrategy {
    Default(Arc<dyn TextPainter>),
    Named(Arc<dyn OutlineProvider>),
}

impl fmt::Debug for FontStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default(_) => f.write_str("FontStrategy::Default"),
            Self::Named(_) => f.write_str("FontStrategy::Named"),
        }
    }
}

/// Resolves font keys to loaded fonts.
pub trait FontSupply: Send + Sync {
    /// Fails with [`RasterError::FontNotFound`] when the key cannot be
    /// resolved.
    fn load_font(&self, key: &FontKey) -> Result<FontStrategy>;
}

/// A parsed TrueType/OpenType font.
///
/// The font bytes live once, inside the ab_glyph font; outlines are read
/// from the same buffer.
pub struct OutlineFont {
    key: String,
    metrics: FontMetrics,
    painter: FontVec,
}

impl fmt::Debug for OutlineFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineFont")
            .field("key", &self.key)
            .field("len", &self.painter.as_slice().len())
            .finish()
    }
}

impl OutlineFont {
    /// Parse font bytes, rejecting anything that is not a usable face.
    pub fn from_bytes(key: &str, data: Vec<u8>) -> Result<Self> {
        let invalid = |reason: String| RasterError::InvalidFont {
            key: key.to_string(),
            reason,
        };
        let metrics = {
            let face = Face::parse(&data, 0).map_err(|e| invalid(e.to_string()))?;
            FontMetrics {
                units_per_em: face.units_per_em(),
                ascender: face.ascender(),
                descender: face.descender(),
            }
        };
        let len = data.len();
        let painter = FontVec::try_from_vec(data).map_err(|e| invalid(e.to_string()))?;
        tracing::debug!(key, len, "Font parsed");
        Ok(Self {
            key: key.to_string(),
            metrics,
            painter,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Face over the shared font bytes. Already validated in `from_bytes`.
    fn face(&self) -> Option<Face<'_>> {
        Face::parse(self.painter.as_slice(), 0).ok()
    }
}

/// Horizontal `kern` table adjustment for a glyph pair, in font units.
fn kerning(face: &Face<'_>, left: GlyphId, right: GlyphId) -> i16 {
    let Some(kern) = face.tables().kern.as_ref() else {
        return 0;
    };
    kern.subtables
        .into_iter()
        .filter(|st| st.horizontal && !st.variable)
        .find_map(|st| st.glyphs_kerning(left, right))
        .unwrap_or(0)
}

impl OutlineProvider for OutlineFont {
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    fn glyph_path(&self, text: &str, size_px: f32) -> GlyphPath {
        let mut path = GlyphPath::new();
        let Some(face) = self.face() else {
            return path;
        };

        let scale = size_px / f32::from(face.units_per_em().max(1));
        let mut pen_x = 0.0f32;
        let mut prev: Option<GlyphId> = None;

        for ch in text.chars() {
            let id = face.glyph_index(ch).unwrap_or(GlyphId(0));
            if let Some(prev) = prev {
                pen_x += f32::from(kerning(&face, prev, id)) * scale;
            }
            let mut builder = GlyphPathBuilder::new(&mut path, pen_x, 0.0, scale);
            // whitespace has no outline
            let _ = face.outline_glyph(id, &mut builder);
            pen_x += f32::from(face.glyph_hor_advance(id).unwrap_or(0)) * scale;
            prev = Some(id);
        }

        path
    }
}

impl TextPainter for OutlineFont {
    fn measure(&self, text: &str, size_px: f32) -> (u32, u32) {
        let scaled = self.painter.as_scaled(PxScale::from(size_px));
        let mut width = 0.0f32;
        let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

        for ch in text.chars() {
            let glyph_id = scaled.glyph_id(ch);
            if let Some(prev) = prev_glyph {
                width += scaled.kern(prev, glyph_id);
            }
            width += scaled.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }

        let line_height = (scaled.ascent() - scaled.descent()).ceil() as u32;
        (width.ceil() as u32, line_height)
    }

    fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, size_px: f32, text: &str, color: Rgba<u8>) {
        draw_text_mut(canvas, color, x, y, PxScale::from(size_px), &self.painter, text);
    }
}
