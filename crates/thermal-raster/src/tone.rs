//! Luminance quantization to the printer's 16 gray levels.
//!
//! Level `n` maps to `round(n / 15 * 255)`, which is exactly `17 * n`,
//! so the fixed points of [`quantize`] are the multiples of 17.

use image::GrayImage;
use tracing::debug;

/// Number of discrete output levels.
pub const LEVEL_COUNT: usize = 16;

/// The luminance value of each level, darkest first.
pub const LEVELS: [u8; LEVEL_COUNT] = {
    let mut levels = [0u8; LEVEL_COUNT];
    let mut i = 0;
    while i < LEVEL_COUNT {
        levels[i] = (i * 17) as u8;
        i += 1;
    }
    levels
};

/// Level index in `0..=15` nearest to `v`.
pub fn level_of(v: u8) -> u8 {
    // round(v / 17); v / 17 never lands on .5 so there is no tie to break
    ((u16::from(v) + 8) / 17) as u8
}

/// Snap a luminance value to the nearest of the 16 fixed levels.
pub fn quantize(v: u8) -> u8 {
    LEVELS[level_of(v) as usize]
}

/// Whether `v` is one of the 16 fixed levels.
pub fn is_level(v: u8) -> bool {
    v % 17 == 0
}

/// Quantize every pixel of an image in place.
pub fn quantize_image(img: &mut GrayImage) {
    let (width, height) = img.dimensions();
    debug!(width, height, "Quantizing to 16 levels");
    for px in img.pixels_mut() {
        px.0[0] = quantize(px.0[0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The float formula the levels are defined by.
    fn reference(v: u8) -> u8 {
        let bin = (f64::from(v) / 255.0 * 15.0).round();
        (bin / 15.0 * 255.0).round() as u8
    }

    #[test]
    fn matches_reference_formula_for_all_inputs() {
        for v in 0..=255u8 {
            assert_eq!(quantize(v), reference(v), "input {v}");
        }
    }

    #[test]
    fn output_is_one_of_sixteen_levels() {
        let mut seen = std::collections::BTreeSet::new();
        for v in 0..=255u8 {
            let q = quantize(v);
            assert!(LEVELS.contains(&q), "{q} is not a level");
            seen.insert(q);
        }
        assert_eq!(seen.len(), LEVEL_COUNT);
    }

    #[test]
    fn idempotent() {
        for v in 0..=255u8 {
            assert_eq!(quantize(quantize(v)), quantize(v));
        }
    }

    #[test]
    fn levels_table_endpoints() {
        assert_eq!(LEVELS[0], 0);
        assert_eq!(LEVELS[1], 17);
        assert_eq!(LEVELS[15], 255);
        assert!(LEVELS.iter().all(|&l| is_level(l)));
    }

    #[test]
    fn boundaries_between_levels() {
        assert_eq!(quantize(8), 0);
        assert_eq!(quantize(9), 17);
        assert_eq!(quantize(246), 238);
        assert_eq!(quantize(247), 255);
    }

    #[test]
    fn quantize_image_snaps_every_pixel() {
        let mut img = GrayImage::from_fn(16, 16, |x, y| image::Luma([(x + y * 16) as u8]));
        quantize_image(&mut img);
        assert!(img.pixels().all(|p| is_level(p.0[0])));
    }
}
