//! Boundary to the device driver that streams rasters to the printer.

use crate::palette::IndexedBitmap;

/// A device driver accepting finished rasters.
///
/// Geometry (byte-aligned width within the dot width) is guaranteed by the
/// pipeline; the driver only has to stream it.
pub trait RasterSink {
    /// Send one raster. Returns whether the device accepted it.
    fn send_raster_image(&self, image: &IndexedBitmap) -> bool;

    /// Send image bytes that could not be normalized.
    ///
    /// These bytes were never resized or aligned. The default refuses them.
    fn send_passthrough(&self, bytes: &[u8]) -> bool {
        tracing::warn!(len = bytes.len(), "Refusing unnormalized image bytes");
        false
    }
}
