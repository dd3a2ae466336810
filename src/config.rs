use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// User settings, loaded from a TOML file. Fields missing from the
/// file fall back to the defaults, so old config files keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: String,
    pub language: String,
    pub autoplay: bool,
    pub volume: u8,
    pub muted: bool,
    pub epg_days: u8,
    pub epg_timeshift_hours: i8,
    pub recents_capacity: usize,
    pub digit_timeout_ms: u64,
    pub catalog_ttl_secs: u64,
    pub guide_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".into(),
            language: "en".into(),
            autoplay: true,
            volume: 100,
            muted: false,
            epg_days: 7,
            epg_timeshift_hours: 0,
            recents_capacity: 10,
            digit_timeout_ms: 3000,
            catalog_ttl_secs: 3600,
            guide_ttl_secs: 3600,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|config| config.join("zaptv").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load settings from `path`. A missing file yields the defaults;
    /// a malformed file is an error the caller decides how to handle.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {path:?}, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {path:?}"))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {path:?}"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir {parent:?}"))?;
        }
        let raw = toml::to_string_pretty(self).context("serializing config")?;
        std::fs::write(path, raw).with_context(|| format!("writing config {path:?}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_merges_over_defaults() {
        let settings: Settings = toml::from_str("volume = 40\ntheme = \"light\"").unwrap();
        assert_eq!(settings.volume, 40);
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.recents_capacity, 10);
        assert_eq!(settings.digit_timeout_ms, 3000);
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let settings = Settings::default();
        let raw = toml::to_string_pretty(&settings).unwrap();
        let back: Settings = toml::from_str(&raw).unwrap();
        assert_eq!(back, settings);
    }
}
