//! Runtime configuration loaded from the environment.

use std::path::PathBuf;

use thermal_raster::{DEFAULT_DOT_WIDTH, PrinterProfile};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Application configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub printer_width: u32,
    pub max_image_height: Option<u32>,
    pub font_dir: PathBuf,
    pub eva_ttf_path: Option<PathBuf>,
    pub default_font_path: Option<PathBuf>,
    pub spool_dir: PathBuf,
    pub dry_run_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            printer_width: DEFAULT_DOT_WIDTH,
            max_image_height: None,
            font_dir: PathBuf::from("fonts"),
            eva_ttf_path: None,
            default_font_path: None,
            spool_dir: PathBuf::from("spool"),
            dry_run_mode: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unset and empty values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(key).map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => {
                    validate_setting(key, &v).map_err(|reason| ConfigError::Invalid { key, reason })?;
                    Ok(Some(v))
                }
                _ => Ok(None),
            }
        };

        let mut config = Self::default();
        if let Some(v) = get("PRINTER_WIDTH")? {
            config.printer_width = parse_u32(&v);
        }
        config.max_image_height = get("MAX_IMAGE_HEIGHT")?.map(|v| parse_u32(&v));
        if let Some(v) = get("FONT_DIR")? {
            config.font_dir = PathBuf::from(v);
        }
        config.eva_ttf_path = get("EVA_TTF_PATH")?.map(PathBuf::from);
        config.default_font_path = get("DEFAULT_FONT_PATH")?.map(PathBuf::from);
        if let Some(v) = get("SPOOL_DIR")? {
            config.spool_dir = PathBuf::from(v);
        }
        if let Some(v) = get("DRY_RUN_MODE")? {
            config.dry_run_mode = v == "true";
        }
        Ok(config)
    }

    /// Printer geometry shared by the normalizer and the title rasterizer.
    pub fn printer_profile(&self) -> Result<PrinterProfile, ConfigError> {
        PrinterProfile::new(self.printer_width, self.max_image_height).map_err(|e| {
            ConfigError::Invalid {
                key: "PRINTER_WIDTH",
                reason: e.to_string(),
            }
        })
    }
}

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "PRINTER_WIDTH" => validate_int_range(value, 8, 4096)?,
        "MAX_IMAGE_HEIGHT" => validate_int_range(value, 1, 1_000_000)?,
        "DRY_RUN_MODE" => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: u32, max: u32) -> Result<(), String> {
    let v: u32 = value.parse().map_err(|_| "must be a positive integer")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

/// Only called on values that already passed [`validate_setting`].
fn parse_u32(value: &str) -> u32 {
    value.parse().unwrap_or_default()
}
