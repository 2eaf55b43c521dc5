//! Single-channel luminance bitmap shared by every pipeline stage.

use image::GrayImage;

/// Row-major 8-bit luminance bitmap, one byte per pixel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Number of channels per pixel. Always one.
    pub const CHANNELS: u8 = 1;

    /// Create a bitmap filled with a single luminance value.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; (width as usize) * (height as usize)],
        }
    }

    /// Wrap an existing pixel buffer.
    ///
    /// Returns `None` if the buffer length does not match `width * height`.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A bitmap with no pixels, returned for blank titles.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Luminance at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the bitmap.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks(0) panics, and an empty bitmap has no rows anyway
        self.pixels.chunks(self.width.max(1) as usize)
    }
}

impl From<GrayImage> for Bitmap {
    fn from(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}

impl From<Bitmap> for GrayImage {
    fn from(bitmap: Bitmap) -> Self {
        let Bitmap {
            width,
            height,
            pixels,
        } = bitmap;
        // Length is an invariant of Bitmap, so this cannot fail for values
        // built through the constructors above.
        GrayImage::from_raw(width, height, pixels)
            .unwrap_or_else(|| GrayImage::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn from_raw_rejects_wrong_length() {
        assert!(Bitmap::from_raw(4, 2, vec![0; 7]).is_none());
        assert!(Bitmap::from_raw(4, 2, vec![0; 8]).is_some());
    }

    #[test]
    fn gray_image_round_trip_keeps_pixels() {
        let mut img = GrayImage::from_pixel(3, 2, Luma([255]));
        img.put_pixel(2, 1, Luma([17]));
        let bitmap = Bitmap::from(img);
        assert_eq!(bitmap.get(2, 1), 17);
        assert_eq!(bitmap.get(0, 0), 255);

        let back: GrayImage = bitmap.into();
        assert_eq!(back.get_pixel(2, 1).0[0], 17);
    }

    #[test]
    fn rows_splits_by_width() {
        let bitmap = Bitmap::from_raw(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let rows: Vec<&[u8]> = bitmap.rows().collect();
        assert_eq!(rows, vec![&[1, 2][..], &[3, 4][..], &[5, 6][..]]);
    }

    #[test]
    fn empty_bitmap_has_no_rows() {
        assert_eq!(Bitmap::empty().rows().count(), 0);
        assert!(Bitmap::empty().is_empty());
    }
}
