use crate::model::Settings;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "playbar";
const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "playbar.log";

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("PLAYBAR_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join(SETTINGS_FILE))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(config_root()?.join(LOG_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_settings() -> Result<Settings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub songs_url: Option<String>,
    pub artist: Option<String>,
    pub audio_extension: Option<String>,
}

impl Overrides {
    pub fn apply(self, mut settings: Settings) -> Settings {
        if let Some(url) = self.songs_url {
            settings.songs_url = url;
        }
        if let Some(artist) = self.artist {
            settings.artist = artist;
        }
        if let Some(ext) = self.audio_extension {
            settings.audio_extension = ext.trim_start_matches('.').to_string();
        }
        settings.initial_volume = settings.initial_volume.min(100);
        settings
    }
}
