use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::warn;

use crate::domain::DEFAULT_RECENT_LIMIT;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "PriceEstimator";
const APP_NAME: &str = "PriceEstimator";

/// User settings stored as `settings.json` in the platform config directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default = "default_require_suburb")]
    pub require_suburb: bool,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: None,
            catalog_path: None,
            require_suburb: default_require_suburb(),
            recent_limit: default_recent_limit(),
            log_level: default_log_level(),
        }
    }
}

fn default_require_suburb() -> bool {
    true
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("settings.json"))
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings() -> Settings {
    settings_file()
        .and_then(|path| load_settings_from(&path))
        .unwrap_or_default()
}

pub fn load_settings_from(path: &Path) -> Option<Settings> {
    let data = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(settings) => Some(settings),
        Err(err) => {
            warn!(path = %path.display(), "ignoring unreadable settings file: {err}");
            None
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf, PersistSaveError> {
    let path = settings_file().ok_or(PersistSaveError::StorageUnavailable)?;
    save_settings_to(&path, settings)?;
    Ok(path)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), PersistSaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PersistSaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
