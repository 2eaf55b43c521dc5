//! 4-bit indexed encoding of quantized bitmaps.
//!
//! Each pixel becomes an index into the fixed 16-entry gray palette.
//! Indices are packed two per byte, high nibble first, so a row of
//! `width` pixels takes `width / 2` bytes.

use tracing::debug;

use crate::bitmap::Bitmap;
use crate::tone::{LEVEL_COUNT, LEVELS, is_level};
use crate::{RasterError, Result};

/// A bitmap of palette indices, ready for the device driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedBitmap {
    width: u32,
    height: u32,
    palette: [u8; LEVEL_COUNT],
    indices: Vec<u8>,
}

/// Pack a quantized bitmap into 4-bit palette indices.
///
/// # Panics
/// Panics if any pixel is not one of the 16 quantization levels. Callers
/// must run the bitmap through the normalizer first.
pub fn encode(bitmap: &Bitmap) -> IndexedBitmap {
    let stride = row_stride(bitmap.width);
    let mut indices = vec![0u8; stride * bitmap.height as usize];

    for (y, row) in bitmap.rows().enumerate() {
        let out = &mut indices[y * stride..(y + 1) * stride];
        for (x, &v) in row.iter().enumerate() {
            assert!(is_level(v), "pixel ({x}, {y}) = {v} is not quantized");
            let index = v / 17;
            if x % 2 == 0 {
                out[x / 2] |= index << 4;
            } else {
                out[x / 2] |= index;
            }
        }
    }

    debug!(
        width = bitmap.width,
        height = bitmap.height,
        bytes = indices.len(),
        "Encoded 4-bit indexed bitmap"
    );

    IndexedBitmap {
        width: bitmap.width,
        height: bitmap.height,
        palette: LEVELS,
        indices,
    }
}

fn row_stride(width: u32) -> usize {
    (width as usize).div_ceil(2)
}

impl IndexedBitmap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Luminance of each palette entry.
    pub fn palette(&self) -> &[u8; LEVEL_COUNT] {
        &self.palette
    }

    /// Packed indices, rows of `width / 2` bytes.
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn row_stride(&self) -> usize {
        row_stride(self.width)
    }

    /// Palette index of the pixel at `(x, y)`.
    pub fn level_at(&self, x: u32, y: u32) -> u8 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let byte = self.indices[y as usize * self.row_stride() + x as usize / 2];
        if x % 2 == 0 { byte >> 4 } else { byte & 0x0f }
    }

    /// Expand back to one luminance byte per pixel.
    pub fn to_bitmap(&self) -> Bitmap {
        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                pixels.push(self.palette[self.level_at(x, y) as usize]);
            }
        }
        Bitmap {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// Encode as a 4-bit paletted PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::Four);
            encoder.set_palette(
                self.palette
                    .iter()
                    .flat_map(|&l| [l, l, l])
                    .collect::<Vec<u8>>(),
            );
            let mut writer = encoder
                .write_header()
                .map_err(|e| RasterError::Png(e.to_string()))?;
            writer
                .write_image_data(&self.indices)
                .map_err(|e| RasterError::Png(e.to_string()))?;
            writer.finish().map_err(|e| RasterError::Png(e.to_string()))?;
        }
        Ok(out)
    }
}
