//! Font files on disk, resolved by key and cached after first load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thermal_raster::{FontKey, FontStrategy, FontSupply, OutlineFont, RasterError};

use crate::config::AppConfig;

const VALID_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Key of the bundled display font used for headline titles.
pub const EVANGELION_KEY: &str = "evangelion";

/// Resolves font keys to files under a font directory.
pub struct FontDirectory {
    root: PathBuf,
    aliases: HashMap<String, PathBuf>,
    default_path: Option<PathBuf>,
    cache: RwLock<HashMap<FontKey, Arc<OutlineFont>>>,
}

impl FontDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            aliases: HashMap::new(),
            default_path: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Directory wired up from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let eva = config
            .eva_ttf_path
            .clone()
            .unwrap_or_else(|| config.font_dir.join("EVA.TTF"));
        let mut dir = Self::new(&config.font_dir).with_alias(EVANGELION_KEY, eva);
        if let Some(path) = &config.default_font_path {
            dir = dir.with_default(path);
        }
        dir
    }

    /// Builder: map a named key to an explicit file.
    pub fn with_alias(mut self, key: &str, path: impl Into<PathBuf>) -> Self {
        self.aliases.insert(key.to_lowercase(), path.into());
        self
    }

    /// Builder: set the file used for the default face.
    pub fn with_default(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = Some(path.into());
        self
    }

    /// Locate the file for `key` without loading it.
    pub fn resolve(&self, key: &FontKey) -> Option<PathBuf> {
        match key {
            FontKey::Default => match &self.default_path {
                Some(path) => path.is_file().then(|| path.clone()),
                None => find_in_dir(&self.root, "default"),
            },
            FontKey::Named(name) => match self.aliases.get(name) {
                Some(path) => path.is_file().then(|| path.clone()),
                None => find_in_dir(&self.root, name),
            },
        }
    }

    fn load(&self, key: &FontKey) -> Result<Arc<OutlineFont>, RasterError> {
        if let Some(font) = self.cache.read().ok().and_then(|c| c.get(key).cloned()) {
            return Ok(font);
        }

        let not_found = || RasterError::FontNotFound {
            key: key.to_string(),
        };
        let path = self.resolve(key).ok_or_else(not_found)?;
        let data = std::fs::read(&path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Font file unreadable");
            not_found()
        })?;
        let font = Arc::new(OutlineFont::from_bytes(key.as_str(), data)?);
        tracing::info!(key = %key, path = %path.display(), "Font loaded");

        if let Ok(mut cache) = self.cache.write() {
            // a concurrent load may have won; keep the first one
            return Ok(cache.entry(key.clone()).or_insert(font).clone());
        }
        Ok(font)
    }
}

impl FontSupply for FontDirectory {
    fn load_font(&self, key: &FontKey) -> Result<FontStrategy, RasterError> {
        let font = self.load(key)?;
        Ok(match key {
            FontKey::Default => FontStrategy::Default(font),
            FontKey::Named(_) => FontStrategy::Named(font),
        })
    }
}

/// Find `<stem>.ttf` or `<stem>.otf` in `dir`, ignoring case.
fn find_in_dir(dir: &Path, stem: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let stem_matches = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.eq_ignore_ascii_case(stem));
        let ext_matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| VALID_EXTENSIONS.contains(&e.to_lowercase().as_str()));
        if stem_matches && ext_matches {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_named_font_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Comic.TTF"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let fonts = FontDirectory::new(dir.path());
        assert_eq!(
            fonts.resolve(&FontKey::parse("comic")),
            Some(dir.path().join("Comic.TTF"))
        );
        assert_eq!(fonts.resolve(&FontKey::parse("notes")), None);
    }

    #[test]
    fn alias_takes_precedence_over_directory() {
        let dir = tempfile::tempdir().unwrap();
        let eva = dir.path().join("EVA.TTF");
        std::fs::write(&eva, b"x").unwrap();

        let fonts = FontDirectory::new("/nonexistent").with_alias(EVANGELION_KEY, &eva);
        assert_eq!(fonts.resolve(&FontKey::parse("Evangelion")), Some(eva));
    }

    #[test]
    fn default_face_uses_configured_path_or_default_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.otf"), b"x").unwrap();
        let fonts = FontDirectory::new(dir.path());
        assert_eq!(
            fonts.resolve(&FontKey::Default),
            Some(dir.path().join("default.otf"))
        );

        let missing = FontDirectory::new(dir.path()).with_default(dir.path().join("gone.ttf"));
        assert_eq!(missing.resolve(&FontKey::Default), None);
    }

    #[test]
    fn unknown_key_is_font_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let fonts = FontDirectory::new(dir.path());
        let err = fonts.load_font(&FontKey::parse("missing")).unwrap_err();
        assert!(matches!(err, RasterError::FontNotFound { ref key } if key == "missing"));
    }

    #[test]
    fn corrupt_file_is_invalid_font() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.ttf"), b"not a font").unwrap();
        let fonts = FontDirectory::new(dir.path());
        let err = fonts.load_font(&FontKey::parse("broken")).unwrap_err();
        assert!(matches!(err, RasterError::InvalidFont { .. }));
    }

    #[test]
    fn real_font_loads_once_for_both_strategies() {
        let dir = tempfile::tempdir().unwrap();
        let font = include_bytes!("../../crates/thermal-raster/tests/fixtures/DejaVuSans.ttf");
        std::fs::write(dir.path().join("EVA.TTF"), font).unwrap();
        std::fs::write(dir.path().join("default.ttf"), font).unwrap();

        let fonts =
            FontDirectory::new(dir.path()).with_alias(EVANGELION_KEY, dir.path().join("EVA.TTF"));
        let named = fonts.load_font(&FontKey::parse("evangelion")).unwrap();
        assert!(matches!(named, FontStrategy::Named(_)));
        assert!(matches!(fonts.load_font(&FontKey::Default).unwrap(), FontStrategy::Default(_)));

        // served from the cache once the file is gone
        std::fs::remove_file(dir.path().join("EVA.TTF")).unwrap();
        assert!(fonts.load_font(&FontKey::parse("evangelion")).is_ok());
    }

    #[test]
    fn from_config_points_evangelion_at_font_dir() {
        let config = AppConfig {
            font_dir: PathBuf::from("/srv/fonts"),
            ..AppConfig::default()
        };
        let fonts = FontDirectory::from_config(&config);
        assert_eq!(
            fonts.aliases.get(EVANGELION_KEY),
            Some(&PathBuf::from("/srv/fonts/EVA.TTF"))
        );
    }
}
