//! Process-wide printer geometry, built once at startup.

use crate::{DEFAULT_DOT_WIDTH, RasterError, Result};

/// Immutable printer configuration injected into the normalizer and the
/// title rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterProfile {
    dot_width: u32,
    max_image_height: Option<u32>,
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self {
            dot_width: DEFAULT_DOT_WIDTH,
            max_image_height: None,
        }
    }
}

impl PrinterProfile {
    /// Build a profile.
    ///
    /// The dot width must hold at least one byte of pixels, and a height
    /// cap, when given, must be positive.
    pub fn new(dot_width: u32, max_image_height: Option<u32>) -> Result<Self> {
        if dot_width < 8 {
            return Err(RasterError::InvalidProfile(format!(
                "dot width must be at least 8, got {dot_width}"
            )));
        }
        if max_image_height == Some(0) {
            return Err(RasterError::InvalidProfile(
                "max image height must be greater than 0".into(),
            ));
        }
        Ok(Self {
            dot_width,
            max_image_height,
        })
    }

    /// Printer's horizontal capacity in dots.
    pub fn dot_width(&self) -> u32 {
        self.dot_width
    }

    /// Optional cap applied to uploaded images.
    pub fn max_image_height(&self) -> Option<u32> {
        self.max_image_height
    }

    /// Widest byte-aligned row that fits on the paper.
    pub fn raster_width(&self) -> u32 {
        self.dot_width & !7
    }
}

/// Round `n` up to the next multiple of 8.
pub fn next_multiple_of_8(n: u32) -> u32 {
    n.div_ceil(8) * 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_80mm() {
        let profile = PrinterProfile::default();
        assert_eq!(profile.dot_width(), 576);
        assert_eq!(profile.raster_width(), 576);
        assert_eq!(profile.max_image_height(), None);
    }

    #[test]
    fn raster_width_rounds_down_to_byte() {
        let profile = PrinterProfile::new(580, None).unwrap();
        assert_eq!(profile.raster_width(), 576);
    }

    #[test]
    fn rejects_narrow_width_and_zero_height() {
        assert!(PrinterProfile::new(7, None).is_err());
        assert!(PrinterProfile::new(384, Some(0)).is_err());
        assert!(PrinterProfile::new(384, Some(1)).is_ok());
    }

    #[test]
    fn next_multiple_of_8_values() {
        assert_eq!(next_multiple_of_8(0), 0);
        assert_eq!(next_multiple_of_8(1), 8);
        assert_eq!(next_multiple_of_8(8), 8);
        assert_eq!(next_multiple_of_8(573), 576);
    }
}
