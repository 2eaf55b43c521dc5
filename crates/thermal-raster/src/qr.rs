//! QR code rasters for ticket footers.

use qrcode::QrCode;

use crate::bitmap::Bitmap;
use crate::profile::PrinterProfile;
use crate::{RasterError, Result};

/// Light margin around the symbol, in modules. Scanners need at least four.
pub const QUIET_ZONE: u32 = 4;

/// Encode `data` as a QR code for the bottom of a ticket: half the paper
/// wide at most, so it stays easy to scan at arm's length.
pub fn footer_qr(data: &str, profile: &PrinterProfile) -> Result<Bitmap> {
    generate_qr(data, profile.raster_width() / 2)
}

/// Encode `data` as a QR code with a white quiet zone, scaled by whole
/// modules to at most `target_width` pixels (one pixel per module if the
/// code does not fit).
pub fn generate_qr(data: &str, target_width: u32) -> Result<Bitmap> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| RasterError::Qr(e.to_string()))?;
    let colors = code.to_colors();
    let modules = code.width() as u32;

    let span = modules + 2 * QUIET_ZONE;
    let scale = (target_width / span).max(1);
    let size = span * scale;

    // module index along one axis, or None inside the quiet zone
    let module_at = |px: u32| {
        (px / scale)
            .checked_sub(QUIET_ZONE)
            .filter(|&m| m < modules)
    };

    let mut pixels = Vec::with_capacity(size as usize * size as usize);
    for y in 0..size {
        let row = module_at(y);
        for x in 0..size {
            let dark = match (module_at(x), row) {
                (Some(mx), Some(my)) => colors[(my * modules + mx) as usize] == qrcode::Color::Dark,
                _ => false,
            };
            pixels.push(if dark { 0 } else { 255 });
        }
    }

    tracing::debug!(modules, scale, size, "Generated QR raster");
    Ok(Bitmap {
        width: size,
        height: size,
        pixels,
    })
}
