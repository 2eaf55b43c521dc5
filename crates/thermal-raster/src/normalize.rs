//! Geometry normalization for printer rasters.
//!
//! Decodes an arbitrary image, flattens transparency onto white, shrinks it
//! to the printer's raster width (never enlarging), optionally crops it to a
//! height cap, pads rows to a byte boundary and snaps every pixel to the
//! 16 printable gray levels.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, RgbImage, Rgb};
use tracing::{debug, warn};

use crate::bitmap::Bitmap;
use crate::profile::{PrinterProfile, next_multiple_of_8};
use crate::tone::quantize_image;

/// Luminance used for padding columns.
const BACKGROUND: u8 = 255;

/// Result of [`GeometryNormalizer::normalize`].
///
/// Undecodable input is not an error: the caller gets its bytes back
/// untouched and has to decide what to do with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeOutcome {
    Normalized(Bitmap),
    PassthroughUnchanged(Vec<u8>),
}

impl NormalizeOutcome {
    pub fn is_normalized(&self) -> bool {
        matches!(self, Self::Normalized(_))
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        match self {
            Self::Normalized(bitmap) => Some(bitmap),
            Self::PassthroughUnchanged(_) => None,
        }
    }
}

/// Shrinks, crops, pads and quantizes images for one printer profile.
#[derive(Debug, Clone, Copy)]
pub struct GeometryNormalizer {
    profile: PrinterProfile,
}

impl GeometryNormalizer {
    pub fn new(profile: PrinterProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &PrinterProfile {
        &self.profile
    }

    /// Normalize encoded image bytes (PNG, JPEG, ...).
    ///
    /// On decode failure the input buffer is handed back unchanged inside
    /// [`NormalizeOutcome::PassthroughUnchanged`]. Such bytes have not been
    /// resized or aligned and may be wider than the paper.
    pub fn normalize(&self, bytes: Vec<u8>, max_height: Option<u32>) -> NormalizeOutcome {
        let decoded = match image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!(len = bytes.len(), error = %e, "Image decode failed, passing input through");
                return NormalizeOutcome::PassthroughUnchanged(bytes);
            }
        };

        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "Decoded image for normalization"
        );
        let flat = DynamicImage::ImageRgb8(flatten_onto_white(&decoded));
        NormalizeOutcome::Normalized(self.finish(flat, max_height))
    }

    /// Normalize an already-decoded luminance bitmap, e.g. a rendered title.
    pub fn normalize_bitmap(&self, bitmap: Bitmap, max_height: Option<u32>) -> Bitmap {
        if bitmap.is_empty() {
            return bitmap;
        }
        self.finish(DynamicImage::ImageLuma8(bitmap.into()), max_height)
    }

    /// Steps shared by both entry points, after transparency is gone.
    fn finish(&self, img: DynamicImage, max_height: Option<u32>) -> Bitmap {
        let resized = fit_to_width(img, self.profile.raster_width());
        let gray = resized.into_luma8();
        let cropped = crop_to_height(gray, max_height);
        let mut padded = pad_to_byte_width(cropped);
        quantize_image(&mut padded);

        debug!(
            width = padded.width(),
            height = padded.height(),
            "Image normalized"
        );
        Bitmap::from(padded)
    }
}

/// Composite every pixel over an opaque white background.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let a = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

/// Shrink an image to at most `max_width` wide, preserving aspect ratio.
///
/// Images already narrow enough are returned unchanged.
fn fit_to_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (orig_w, orig_h) = (img.width(), img.height());

    if orig_w <= max_width {
        debug!(orig_w, max_width, "Image fits, skipping resize");
        return img;
    }

    let ratio = f64::from(max_width) / f64::from(orig_w);
    let new_height = (f64::from(orig_h) * ratio).round() as u32;
    let new_height = new_height.max(1);

    debug!(
        orig_w,
        orig_h,
        new_width = max_width,
        new_height,
        "Shrinking image to raster width"
    );

    img.resize_exact(max_width, new_height, FilterType::Lanczos3)
}

/// Keep only the top `max_height` rows. Content below is discarded.
fn crop_to_height(img: GrayImage, max_height: Option<u32>) -> GrayImage {
    match max_height.filter(|&h| h > 0) {
        Some(limit) if img.height() > limit => {
            debug!(height = img.height(), limit, "Cropping image to height cap");
            imageops::crop_imm(&img, 0, 0, img.width(), limit).to_image()
        }
        _ => img,
    }
}

/// Extend the right edge with background columns up to a multiple of 8.
fn pad_to_byte_width(img: GrayImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let padded_width = next_multiple_of_8(width);
    if padded_width == width {
        return img;
    }

    let mut out = GrayImage::from_pixel(padded_width, height, Luma([BACKGROUND]));
    imageops::replace(&mut out, &img, 0, 0);
    out
}
