//! Stand-in device drivers: dry-run logging and a PNG spool directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thermal_raster::{IndexedBitmap, RasterSink};

/// Logs each raster instead of printing it.
#[derive(Debug, Default)]
pub struct DryRunSink {
    sent: AtomicU64,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rasters accepted so far.
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

impl RasterSink for DryRunSink {
    fn send_raster_image(&self, image: &IndexedBitmap) -> bool {
        let n = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            n,
            width = image.width(),
            height = image.height(),
            bytes = image.indices().len(),
            "Dry-run: raster not sent to printer"
        );
        true
    }
}

/// Writes every raster to a directory as a 4-bit PNG.
#[derive(Debug, Clone)]
pub struct SpoolSink {
    dir: PathBuf,
}

impl SpoolSink {
    /// Create the spool directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_path(&self, ext: &str) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        self.dir.join(format!("{stamp}-{}.{ext}", uuid::Uuid::new_v4()))
    }

    fn write(&self, ext: &str, bytes: &[u8]) -> bool {
        let path = self.next_path(ext);
        match std::fs::write(&path, bytes) {
            Ok(()) => {
                tracing::info!(path = %path.display(), len = bytes.len(), "Spooled print data");
                true
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "Failed to spool print data: {e}");
                false
            }
        }
    }
}

impl RasterSink for SpoolSink {
    fn send_raster_image(&self, image: &IndexedBitmap) -> bool {
        match image.to_png() {
            Ok(png) => self.write("png", &png),
            Err(e) => {
                tracing::error!("Failed to encode raster: {e}");
                false
            }
        }
    }

    fn send_passthrough(&self, bytes: &[u8]) -> bool {
        tracing::warn!(len = bytes.len(), "Spooling unnormalized image bytes");
        self.write("bin", bytes)
    }
}
