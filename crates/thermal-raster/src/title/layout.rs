//! Placement math for title canvases.

use crate::font::FontMetrics;
use crate::title::outline::BoundingBox;

/// Narrowest text box used when the padding leaves no room.
const MIN_TEXT_WIDTH: f32 = 16.0;

/// Share of the ascent placed above the baseline, leaving a little headroom.
const BASELINE_HEADROOM: f32 = 0.95;

/// Tallest title canvas the rasterizer will allocate.
pub const MAX_CANVAS_HEIGHT: u32 = 4096;

/// Canvas size and path transform for a named-font title.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedLayout {
    /// Uniform path scale, never above 1.0.
    pub scale: f32,
    pub tx: f32,
    pub baseline_y: f32,
    pub width: u32,
    pub height: u32,
}

impl NamedLayout {
    /// Fit an outline measured at its requested size onto a `width` wide
    /// canvas, shrinking (never growing) it to the width left by `padding`.
    pub fn compute(
        width: u32,
        padding: u32,
        font_size: f32,
        bbox: &BoundingBox,
        metrics: &FontMetrics,
    ) -> Self {
        let canvas_w = width as f32;
        let padding = padding as f32;
        let text_w = bbox.width().max(1.0);

        let max_text_w = (canvas_w - padding * 2.0).max(MIN_TEXT_WIDTH);
        let scale = (max_text_w / text_w).min(1.0);

        let ascent = metrics.ascent_px(font_size) * scale;
        let descent = metrics.descent_px(font_size) * scale;
        // saturate instead of wrapping; oversized canvases are refused later
        let height = (padding + ascent + descent + padding)
            .ceil()
            .clamp(1.0, u32::MAX as f32) as u32;

        // left edge of the box lands at the centered position
        let tx = ((canvas_w - text_w * scale) / 2.0 - bbox.x1 * scale).round();
        let baseline_y = (padding + ascent * BASELINE_HEADROOM).round();

        Self {
            scale,
            tx,
            baseline_y,
            width,
            height,
        }
    }
}

/// Canvas height for a default-font title.
pub fn default_height(padding: u32, font_size: u32) -> u32 {
    padding
        .saturating_mul(2)
        .saturating_add(font_size)
        .max(1)
}

/// Top-left corner that centers a `text_w` x `line_h` box on the canvas.
pub fn centered_origin(canvas_w: u32, canvas_h: u32, text_w: u32, line_h: u32) -> (i32, i32) {
    let x = (i64::from(canvas_w) - i64::from(text_w)) / 2;
    let y = (i64::from(canvas_h) - i64::from(line_h)) / 2;
    (x as i32, y as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: FontMetrics = FontMetrics {
        units_per_em: 1000,
        ascender: 800,
        descender: -200,
    };

    fn bbox(x1: f32, x2: f32) -> BoundingBox {
        BoundingBox {
            x1,
            y1: -40.0,
            x2,
            y2: 0.0,
        }
    }

    #[test]
    fn wide_text_is_shrunk_to_available_width() {
        let layout = NamedLayout::compute(576, 12, 64.0, &bbox(0.0, 700.0), &METRICS);
        assert!((layout.scale - 552.0 / 700.0).abs() < 1e-5);
        assert!(700.0 * layout.scale <= 552.0 + 1e-3);
        // (12 + 51.2 * s + 12.8 * s + 12) rounded up
        assert_eq!(layout.height, 75);
        assert_eq!(layout.tx, 12.0);
        assert_eq!(layout.baseline_y, 50.0);
    }

    #[test]
    fn narrow_text_is_never_enlarged() {
        let layout = NamedLayout::compute(576, 12, 64.0, &bbox(0.0, 100.0), &METRICS);
        assert_eq!(layout.scale, 1.0);
        assert_eq!(layout.height, 88);
        assert_eq!(layout.tx, 238.0);
    }

    #[test]
    fn left_bearing_is_compensated() {
        let layout = NamedLayout::compute(576, 12, 64.0, &bbox(10.0, 110.0), &METRICS);
        // box starts at x = 10, so shift left by 10 to keep it centered
        assert_eq!(layout.tx, 228.0);
    }

    #[test]
    fn zero_width_text_counts_as_one_pixel() {
        let layout = NamedLayout::compute(576, 12, 64.0, &BoundingBox::ZERO, &METRICS);
        assert_eq!(layout.scale, 1.0);
        assert!(layout.tx > 280.0);
    }

    #[test]
    fn padding_larger_than_canvas_uses_minimum_width() {
        let layout = NamedLayout::compute(32, 20, 64.0, &bbox(0.0, 160.0), &METRICS);
        assert!((layout.scale - 0.1).abs() < 1e-5);
    }

    #[test]
    fn default_height_adds_padding_twice() {
        assert_eq!(default_height(12, 64), 88);
        assert_eq!(default_height(0, 0), 1);
    }

    #[test]
    fn huge_sizes_saturate() {
        assert_eq!(default_height(u32::MAX / 2 + 1, 64), u32::MAX);
        let layout = NamedLayout::compute(576, u32::MAX, 64.0, &bbox(0.0, 100.0), &METRICS);
        assert_eq!(layout.height, u32::MAX);
    }

    #[test]
    fn centered_origin_can_go_negative() {
        assert_eq!(centered_origin(576, 88, 100, 60), (238, 14));
        assert_eq!(centered_origin(100, 10, 200, 20), (-50, -5));
    }
}
