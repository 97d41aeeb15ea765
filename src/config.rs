//! Application configuration
//!
//! Read from `<config_dir>/flux/config.json`. Every field has a default, so a
//! missing file or a partial one is fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FluxError, Result};

const APP_DIR: &str = "flux";
const CONFIG_FILE: &str = "config.json";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Where the last-opened repository is remembered
    pub session_file: PathBuf,
    /// Title of the directory picker
    pub dialog_title: String,
    /// Commits loaded per branch when opening a repository
    pub commit_history_limit: usize,
    pub watch_enabled: bool,
    pub watch_debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            session_file: data_dir.join(APP_DIR).join(SESSION_FILE),
            dialog_title: "Open Flux Repository".to_string(),
            commit_history_limit: 200,
            watch_enabled: true,
            watch_debounce_ms: 500,
        }
    }
}

impl AppConfig {
    /// Load from the user's config directory
    pub fn load() -> Result<Self> {
        match dirs::config_dir() {
            Some(dir) => Self::load_from(&dir.join(APP_DIR).join(CONFIG_FILE)),
            None => {
                tracing::warn!("Could not find config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            FluxError::OperationFailed(format!("Failed to read config: {}", e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| FluxError::OperationFailed(format!("Failed to parse config: {}", e)))
    }
}
