use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::paths::ensure_dir;

/// Configuration for the analysis API proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub api_base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001/api/claude".to_string(),
            model: "claude-3-opus-20240229".to_string(),
            max_tokens: 2000,
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn get_settings_path(dir: &Path) -> PathBuf {
    dir.join("settings.json")
}

pub fn load_settings(dir: &Path) -> AppSettings {
    let path = get_settings_path(dir);

    if !path.exists() {
        return AppSettings::default();
    }

    load_settings_from_file(&path).unwrap_or_default()
}

fn load_settings_from_file(path: &Path) -> Result<AppSettings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

pub fn save_settings(dir: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    ensure_dir(dir)?;

    let path = get_settings_path(dir);
    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, contents)?;
    Ok(())
}
