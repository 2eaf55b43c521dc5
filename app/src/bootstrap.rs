//! Startup: environment loading and wiring of the pipeline.

use std::sync::Arc;

use thermal_raster::RasterSink;

use crate::config::AppConfig;
use crate::fonts::FontDirectory;
use crate::sinks::{DryRunSink, SpoolSink};
use crate::ticket::TicketComposer;

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Read configuration and build the composer and device sink.
pub fn init_foundation() -> Result<(AppConfig, TicketComposer, Box<dyn RasterSink>), anyhow::Error> {
    load_dotenv();
    let config = AppConfig::from_env()?;
    let profile = config.printer_profile()?;
    tracing::info!(
        dot_width = profile.dot_width(),
        max_image_height = ?profile.max_image_height(),
        "Printer profile loaded"
    );

    let fonts = Arc::new(FontDirectory::from_config(&config));
    let composer = TicketComposer::new(profile, fonts);

    let sink: Box<dyn RasterSink> = if config.dry_run_mode {
        tracing::info!("Dry-run mode: rasters are logged, not printed");
        Box::new(DryRunSink::new())
    } else {
        tracing::info!(dir = %config.spool_dir.display(), "Spooling rasters");
        Box::new(SpoolSink::new(&config.spool_dir)?)
    };

    Ok((config, composer, sink))
}
