use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const APP_DIR: &str = "esmart";
const STATE_FILE: &str = "state.json";

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct PersistedState {
    pub(crate) theme_name: String,
    #[serde(default)]
    pub(crate) preview_fullscreen: Option<bool>,
}

/// Where the snapshot, preview document, UI state and log live.
pub(crate) fn default_state_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join(APP_DIR));
    }
    if let Ok(appdata) = std::env::var("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join(APP_DIR));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join(APP_DIR))
}

pub(crate) fn load_persisted_state(state_dir: &Path) -> Option<PersistedState> {
    let raw = fs::read_to_string(state_dir.join(STATE_FILE)).ok()?;
    serde_json::from_str::<PersistedState>(&raw).ok()
}

pub(crate) fn save_persisted_state(state_dir: &Path, state: &PersistedState) -> io::Result<()> {
    fs::create_dir_all(state_dir)?;
    let raw = serde_json::to_string_pretty(state)
        .map_err(|e| io::Error::other(format!("serialize state: {e}")))?;
    fs::write(state_dir.join(STATE_FILE), raw)
}
