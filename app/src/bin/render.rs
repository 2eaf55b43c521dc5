//! Command-line ticket renderer.
//!
//! Composes a ticket from a title, body text, an image file and a QR
//! payload, then hands it to the configured device sink.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ticket_printer_lib::bootstrap;
use ticket_printer_lib::ticket::{ImagePayload, TicketRequest, print_ticket};

#[derive(Debug, Parser)]
#[command(name = "ticket-render", about = "Render and print a thermal ticket")]
struct Args {
    /// Ticket title, rendered as an image.
    #[arg(long)]
    title: Option<String>,

    /// Title font key ("default" or a named font such as "evangelion").
    #[arg(long)]
    font: Option<String>,

    /// Plain body text.
    #[arg(long)]
    body: Option<String>,

    /// Image file to print below the body.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Text to encode as a QR code at the bottom.
    #[arg(long)]
    qr: Option<String>,

    /// Title font size in pixels.
    #[arg(long)]
    font_size: Option<u32>,

    /// Padding around the title in pixels.
    #[arg(long)]
    padding: Option<u32>,

    /// Title background color.
    #[arg(long)]
    bg: Option<String>,

    /// Title foreground color.
    #[arg(long)]
    fg: Option<String>,

    /// JSON request file (same fields as the print API body).
    #[arg(long, conflicts_with_all = ["title", "body", "image", "qr"])]
    request: Option<PathBuf>,
}

impl Args {
    fn into_request(self) -> anyhow::Result<(TicketRequest, Option<ImagePayload>)> {
        if let Some(path) = self.request {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let request: TicketRequest = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?;
            return Ok((request, None));
        }

        let image = match &self.image {
            Some(path) => Some(ImagePayload(
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?,
            )),
            None => None,
        };
        let request = TicketRequest {
            title: self.title,
            body: self.body,
            image_base64: None,
            font: self.font,
            qr: self.qr,
            font_size_px: self.font_size,
            padding_px: self.padding,
            bg: self.bg,
            fg: self.fg,
        };
        Ok((request, image))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let (_config, composer, sink) = bootstrap::init_foundation()?;

    let (request, image) = args.into_request()?;
    let ticket = match image {
        Some(image) => composer.compose_with_image(&request, Some(image))?,
        None => composer.compose(&request)?,
    };
    print_ticket(&ticket, sink.as_ref())?;

    tracing::info!("Ticket printed");
    Ok(())
}
