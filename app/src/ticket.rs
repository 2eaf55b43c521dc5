//! Ticket composition: title, body text, optional image and QR code.
//!
//! A ticket request is turned into printer-ready rasters and then handed,
//! part by part, to a [`RasterSink`].

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use thermal_raster::{
    Color, FontKey, FontSupply, GeometryNormalizer, IndexedBitmap, NormalizeOutcome,
    PrinterProfile, RasterError, RasterSink, RenderOptions, TitleRasterizer, encode, qr,
};

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("Invalid base64 image payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Printer rejected {0}")]
    DeviceRejected(&'static str),
}

/// Largest title font size a client may request.
pub const MAX_FONT_SIZE_PX: u32 = 512;

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<u32, TicketError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(TicketError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Raw image bytes attached to a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload(pub Vec<u8>);

impl ImagePayload {
    /// Decode base64, with or without a `data:image/...;base64,` prefix.
    pub fn from_base64(value: &str) -> Result<Self, TicketError> {
        let value = value.trim();
        let b64 = strip_data_url(value).unwrap_or(value);
        Ok(Self(STANDARD.decode(b64)?))
    }
}

fn strip_data_url(value: &str) -> Option<&str> {
    let rest = value.strip_prefix("data:image/")?;
    let (mime, data) = rest.split_once(";base64,")?;
    let valid = !mime.is_empty()
        && mime
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'));
    valid.then_some(data)
}

/// A print request as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub qr: Option<String>,
    #[serde(default)]
    pub font_size_px: Option<u32>,
    #[serde(default)]
    pub padding_px: Option<u32>,
    #[serde(default)]
    pub bg: Option<String>,
    #[serde(default)]
    pub fg: Option<String>,
}

impl TicketRequest {
    /// Title render options, with defaults for anything unset.
    ///
    /// Font size must be in `1..=MAX_FONT_SIZE_PX` and padding at most half
    /// the profile's dot width.
    pub fn render_options(&self, profile: &PrinterProfile) -> Result<RenderOptions, TicketError> {
        let parse_color = |value: &Option<String>, fallback: Color| match value {
            Some(v) => Color::parse(v).ok_or_else(|| TicketError::InvalidColor(v.clone())),
            None => Ok(fallback),
        };
        let defaults = RenderOptions::default();
        let font_size = check_range(
            "fontSizePx",
            self.font_size_px.unwrap_or(defaults.font_size_px),
            1,
            MAX_FONT_SIZE_PX,
        )?;
        let padding = check_range(
            "paddingPx",
            self.padding_px.unwrap_or(defaults.padding_px),
            0,
            profile.dot_width() / 2,
        )?;
        Ok(RenderOptions::new()
            .with_font(FontKey::parse(self.font.as_deref().unwrap_or_default()))
            .with_font_size(font_size)
            .with_padding(padding)
            .with_colors(
                parse_color(&self.bg, defaults.background)?,
                parse_color(&self.fg, defaults.foreground)?,
            ))
    }
}

/// Image section of a composed ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketImage {
    Raster(IndexedBitmap),
    /// Bytes that failed to decode, kept as uploaded.
    Passthrough(Vec<u8>),
}

/// Everything needed to print one ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ticket {
    pub title: Option<IndexedBitmap>,
    pub body: Option<String>,
    pub image: Option<TicketImage>,
    pub qr: Option<IndexedBitmap>,
}

/// Builds tickets for one printer profile and font supply.
#[derive(Clone)]
pub struct TicketComposer {
    profile: PrinterProfile,
    normalizer: GeometryNormalizer,
    titles: TitleRasterizer,
    fonts: Arc<dyn FontSupply>,
}

impl TicketComposer {
    pub fn new(profile: PrinterProfile, fonts: Arc<dyn FontSupply>) -> Self {
        Self {
            profile,
            normalizer: GeometryNormalizer::new(profile),
            titles: TitleRasterizer::new(profile),
            fonts,
        }
    }

    /// Render and normalize every part of `request`.
    ///
    /// Uploaded image bytes are decoded with the profile's height cap.
    pub fn compose(&self, request: &TicketRequest) -> Result<Ticket, TicketError> {
        let image = request
            .image_base64
            .as_deref()
            .map(ImagePayload::from_base64)
            .transpose()?;
        self.compose_with_image(request, image)
    }

    /// Like [`compose`](Self::compose), with image bytes supplied directly.
    pub fn compose_with_image(
        &self,
        request: &TicketRequest,
        image: Option<ImagePayload>,
    ) -> Result<Ticket, TicketError> {
        let mut ticket = Ticket::default();

        if let Some(title) = request.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let options = request.render_options(&self.profile)?;
            let raster = self.titles.render_title(title, &options, self.fonts.as_ref())?;
            let normalized = self.normalizer.normalize_bitmap(raster, None);
            ticket.title = Some(encode(&normalized));
        }

        ticket.body = request.body.clone().filter(|b| !b.is_empty());

        if let Some(ImagePayload(bytes)) = image.filter(|p| !p.0.is_empty()) {
            ticket.image = Some(
                match self.normalizer.normalize(bytes, self.profile.max_image_height()) {
                    NormalizeOutcome::Normalized(bitmap) => TicketImage::Raster(encode(&bitmap)),
                    NormalizeOutcome::PassthroughUnchanged(bytes) => {
                        tracing::warn!(len = bytes.len(), "Ticket image kept unnormalized");
                        TicketImage::Passthrough(bytes)
                    }
                },
            );
        }

        if let Some(data) = request.qr.as_deref().filter(|q| !q.trim().is_empty()) {
            let code = qr::footer_qr(data, &self.profile)?;
            ticket.qr = Some(encode(&self.normalizer.normalize_bitmap(code, None)));
        }

        Ok(ticket)
    }
}

/// Send a composed ticket to the device, top to bottom.
pub fn print_ticket(ticket: &Ticket, sink: &dyn RasterSink) -> Result<(), TicketError> {
    if let Some(title) = &ticket.title {
        if !sink.send_raster_image(title) {
            return Err(TicketError::DeviceRejected("title"));
        }
    }

    if let Some(body) = &ticket.body {
        tracing::info!(chars = body.chars().count(), "Ticket body: {body}");
    }

    match &ticket.image {
        Some(TicketImage::Raster(image)) => {
            if !sink.send_raster_image(image) {
                return Err(TicketError::DeviceRejected("image"));
            }
        }
        Some(TicketImage::Passthrough(bytes)) => {
            tracing::warn!(len = bytes.len(), "Sending image bytes that were never normalized");
            if !sink.send_passthrough(bytes) {
                return Err(TicketError::DeviceRejected("unnormalized image"));
            }
        }
        None => {}
    }

    if let Some(code) = &ticket.qr {
        if !sink.send_raster_image(code) {
            return Err(TicketError::DeviceRejected("QR code"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;
    use thermal_raster::FontStrategy;

    struct NoFonts;

    impl FontSupply for NoFonts {
        fn load_font(&self, key: &FontKey) -> Result<FontStrategy, RasterError> {
            Err(RasterError::FontNotFound {
                key: key.to_string(),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        sizes: RefCell<Vec<(u32, u32)>>,
        passthrough: RefCell<usize>,
        accept: bool,
    }

    impl RasterSink for Recorder {
        fn send_raster_image(&self, image: &IndexedBitmap) -> bool {
            self.sizes.borrow_mut().push((image.width(), image.height()));
            self.accept
        }

        fn send_passthrough(&self, bytes: &[u8]) -> bool {
            *self.passthrough.borrow_mut() += bytes.len();
            self.accept
        }
    }

    fn composer() -> TicketComposer {
        let profile = PrinterProfile::new(384, Some(100)).unwrap();
        TicketComposer::new(profile, Arc::new(NoFonts))
    }

    fn png_base64(width: u32, height: u32) -> String {
        let img = image::GrayImage::from_pixel(width, height, image::Luma([40]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        STANDARD.encode(buf.into_inner())
    }

    #[test]
    fn strips_data_url_prefix() {
        let payload = ImagePayload::from_base64("data:image/svg+xml;base64,aGVsbG8=").unwrap();
        assert_eq!(payload.0, b"hello");
        let bare = ImagePayload::from_base64("aGVsbG8=").unwrap();
        assert_eq!(bare.0, b"hello");
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(matches!(
            ImagePayload::from_base64("data:image/png;base64,@@@"),
            Err(TicketError::InvalidBase64(_))
        ));
    }

    #[test]
    fn request_deserializes_camel_case() {
        let request: TicketRequest = serde_json::from_str(
            r#"{"title":"Hi","body":"text","imageBase64":"aGk=","font":"evangelion","qr":"x"}"#,
        )
        .unwrap();
        assert_eq!(request.title.as_deref(), Some("Hi"));
        assert_eq!(request.image_base64.as_deref(), Some("aGk="));
        assert_eq!(request.font.as_deref(), Some("evangelion"));
    }

    #[test]
    fn render_options_use_defaults_and_overrides() {
        let request = TicketRequest {
            font: Some("Evangelion".into()),
            font_size_px: Some(48),
            bg: Some("#000".into()),
            ..TicketRequest::default()
        };
        let options = request.render_options(&PrinterProfile::default()).unwrap();
        assert_eq!(options.font_key, FontKey::Named("evangelion".into()));
        assert_eq!(options.font_size_px, 48);
        assert_eq!(options.padding_px, 12);
        assert_eq!(options.background, Color::BLACK);
        assert_eq!(options.foreground, Color::BLACK);
    }

    #[test]
    fn invalid_color_is_reported() {
        let request = TicketRequest {
            fg: Some("pink".into()),
            ..TicketRequest::default()
        };
        assert!(matches!(
            request.render_options(&PrinterProfile::default()),
            Err(TicketError::InvalidColor(c)) if c == "pink"
        ));
    }

    #[test]
    fn title_sizes_are_bounded() {
        let profile = PrinterProfile::default();
        let cases = [
            (Some(0), None, "fontSizePx"),
            (Some(MAX_FONT_SIZE_PX + 1), None, "fontSizePx"),
            (Some(1 << 31), None, "fontSizePx"),
            (None, Some(289), "paddingPx"),
            (None, Some(u32::MAX / 2 + 1), "paddingPx"),
        ];
        for (font_size_px, padding_px, expected) in cases {
            let request = TicketRequest {
                font_size_px,
                padding_px,
                ..TicketRequest::default()
            };
            match request.render_options(&profile) {
                Err(TicketError::OutOfRange { field, .. }) => assert_eq!(field, expected),
                other => panic!("{font_size_px:?}/{padding_px:?} gave {other:?}"),
            }
        }

        let edge = TicketRequest {
            font_size_px: Some(MAX_FONT_SIZE_PX),
            padding_px: Some(288),
            ..TicketRequest::default()
        };
        assert!(edge.render_options(&profile).is_ok());
    }

    #[test]
    fn oversized_title_request_fails_before_font_lookup() {
        let request = TicketRequest {
            title: Some("Hi".into()),
            padding_px: Some(u32::MAX / 2 + 1),
            ..TicketRequest::default()
        };
        let err = composer().compose(&request).unwrap_err();
        assert!(matches!(err, TicketError::OutOfRange { field: "paddingPx", .. }));
    }

    #[test]
    fn missing_title_font_fails_the_ticket() {
        let request = TicketRequest {
            title: Some("Hello".into()),
            font: Some("evangelion".into()),
            ..TicketRequest::default()
        };
        let err = composer().compose(&request).unwrap_err();
        assert!(matches!(err, TicketError::Raster(RasterError::FontNotFound { .. })));
    }

    #[test]
    fn named_title_renders_with_font_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let eva = dir.path().join("EVA.TTF");
        std::fs::write(
            &eva,
            include_bytes!("../../crates/thermal-raster/tests/fixtures/DejaVuSans.ttf"),
        )
        .unwrap();
        let fonts = crate::fonts::FontDirectory::new(dir.path())
            .with_alias(crate::fonts::EVANGELION_KEY, &eva);
        let composer = TicketComposer::new(PrinterProfile::default(), Arc::new(fonts));

        let request = TicketRequest {
            title: Some("NERV".into()),
            font: Some("Evangelion".into()),
            ..TicketRequest::default()
        };
        let title = composer.compose(&request).unwrap().title.unwrap();
        assert_eq!(title.width(), 576);
        assert_eq!(title.height(), 99);
        assert!(title.to_bitmap().pixels.iter().any(|&v| v < 128));
    }

    #[test]
    fn blank_title_skips_rendering() {
        let request = TicketRequest {
            title: Some("   ".into()),
            body: Some("just text".into()),
            ..TicketRequest::default()
        };
        let ticket = composer().compose(&request).unwrap();
        assert!(ticket.title.is_none());
        assert_eq!(ticket.body.as_deref(), Some("just text"));
    }

    #[test]
    fn image_is_normalized_with_height_cap() {
        let request = TicketRequest {
            image_base64: Some(png_base64(800, 1000)),
            ..TicketRequest::default()
        };
        let ticket = composer().compose(&request).unwrap();
        match ticket.image {
            Some(TicketImage::Raster(raster)) => {
                assert_eq!((raster.width(), raster.height()), (384, 100));
            }
            other => panic!("unexpected image {other:?}"),
        }
    }

    #[test]
    fn undecodable_image_is_kept_as_passthrough() {
        let ticket = composer()
            .compose_with_image(&TicketRequest::default(), Some(ImagePayload(b"junk".to_vec())))
            .unwrap();
        assert_eq!(ticket.image, Some(TicketImage::Passthrough(b"junk".to_vec())));
    }

    #[test]
    fn qr_fits_half_the_paper() {
        let request = TicketRequest {
            qr: Some("https://example.com".into()),
            ..TicketRequest::default()
        };
        let qr = composer().compose(&request).unwrap().qr.unwrap();
        assert!(qr.width() <= 192);
        assert_eq!(qr.width() % 8, 0);
    }

    #[test]
    fn print_sends_rasters_in_order() {
        let request = TicketRequest {
            image_base64: Some(png_base64(100, 20)),
            qr: Some("abc".into()),
            ..TicketRequest::default()
        };
        let ticket = composer().compose(&request).unwrap();
        let sink = Recorder {
            accept: true,
            ..Recorder::default()
        };
        print_ticket(&ticket, &sink).unwrap();
        let sizes = sink.sizes.borrow();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[0], (104, 20));
    }

    #[test]
    fn rejected_raster_is_an_error() {
        let request = TicketRequest {
            image_base64: Some(png_base64(16, 16)),
            ..TicketRequest::default()
        };
        let ticket = composer().compose(&request).unwrap();
        let err = print_ticket(&ticket, &Recorder::default()).unwrap_err();
        assert!(matches!(err, TicketError::DeviceRejected("image")));
    }

    #[test]
    fn passthrough_goes_to_sink_hook() {
        let ticket = Ticket {
            image: Some(TicketImage::Passthrough(vec![1, 2, 3])),
            ..Ticket::default()
        };
        let sink = Recorder {
            accept: true,
            ..Recorder::default()
        };
        print_ticket(&ticket, &sink).unwrap();
        assert_eq!(*sink.passthrough.borrow(), 3);
    }
}
