//! Raster pipeline for thermal receipt printers.
//!
//! Turns uploaded images and rendered titles into byte-aligned,
//! 16-level luminance bitmaps and packs them into 4-bit indexed
//! rasters for the device driver.

pub mod bitmap;
pub mod color;
pub mod font;
pub mod normalize;
pub mod palette;
pub mod profile;
pub mod qr;
pub mod sink;
pub mod title;
pub mod tone;

// Re-exports for convenience
pub use bitmap::Bitmap;
pub use color::Color;
pub use font::{FontKey, FontMetrics, FontStrategy, FontSupply, OutlineFont, OutlineProvider, TextPainter};
pub use normalize::{GeometryNormalizer, NormalizeOutcome};
pub use palette::{IndexedBitmap, encode};
pub use profile::PrinterProfile;
pub use sink::RasterSink;
pub use title::{RenderOptions, TitleRasterizer};
pub use tone::quantize;

/// Dot width of 80 mm paper on most ESC/POS receipt printers.
pub const DEFAULT_DOT_WIDTH: u32 = 576;

/// Errors that can occur while producing a raster.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Font not found for key '{key}'")]
    FontNotFound { key: String },

    #[error("Invalid font data for key '{key}': {reason}")]
    InvalidFont { key: String, reason: String },

    #[error("Invalid printer profile: {0}")]
    InvalidProfile(String),

    #[error("Cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[error("QR encode error: {0}")]
    Qr(String),

    #[error("PNG encode error: {0}")]
    Png(String),
}

/// Result type alias for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;
