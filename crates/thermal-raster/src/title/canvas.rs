//! Rasterization of title canvases into luminance bitmaps.

use image::{DynamicImage, RgbaImage, imageops};
use tiny_skia::{FillRule, Paint, Pixmap, Transform};

use crate::bitmap::Bitmap;
use crate::color::Color;
use crate::title::outline::GlyphPath;
use crate::{RasterError, Result};

/// Fill `path` with `foreground` on a `width` x `height` canvas of
/// `background`, returning the luminance of the result.
pub fn fill_path(
    path: &GlyphPath,
    width: u32,
    height: u32,
    background: Color,
    foreground: Color,
) -> Result<Bitmap> {
    let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::Canvas { width, height })?;
    pixmap.fill(background.to_skia());

    if let Some(skia_path) = path.to_skia() {
        let mut paint = Paint::default();
        paint.set_color(foreground.to_skia());
        paint.anti_alias = true;
        pixmap.fill_path(
            &skia_path,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    // Opaque background, so premultiplied RGBA equals straight RGBA.
    let rgba = RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or(RasterError::Canvas { width, height })?;
    Ok(to_luma(rgba))
}

/// Convert an opaque RGBA canvas to single-channel luminance.
pub fn to_luma(canvas: RgbaImage) -> Bitmap {
    Bitmap::from(DynamicImage::ImageRgba8(canvas).into_luma8())
}

/// Keep only the top `max_height` rows of a title.
pub fn crop_top(bitmap: Bitmap, max_height: Option<u32>) -> Bitmap {
    match max_height {
        Some(limit) if limit < bitmap.height => {
            let width = bitmap.width;
            let gray: image::GrayImage = bitmap.into();
            Bitmap::from(imageops::crop_imm(&gray, 0, 0, width, limit).to_image())
        }
        _ => bitmap,
    }
}
