//! Settings file helpers

use anyhow::Context;
use shared::settings::AppSettings;
use std::fs;
use std::path::{Path, PathBuf};

/// `<config dir>/vizion/settings.json`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vizion").join("settings.json"))
}

/// Load settings from the default location. A first run writes the defaults
/// back so there is a file to put the API key in.
pub fn load_settings_or_default() -> AppSettings {
    let Some(path) = config_path() else {
        tracing::warn!("no config directory; using default settings");
        return AppSettings::default();
    };

    let (settings, fresh) = load_settings_from(&path);
    if fresh {
        if let Err(e) = save_settings_to(&path, &settings) {
            tracing::warn!("could not write default settings: {:#}", e);
        }
    }
    settings
}

/// Returns the settings and whether they are fresh defaults (no file yet).
/// An unreadable file falls back to defaults but is not reported as fresh,
/// so it never gets overwritten.
pub fn load_settings_from(path: &Path) -> (AppSettings, bool) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return (AppSettings::default(), true);
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "could not read settings: {}", e);
            return (AppSettings::default(), false);
        }
    };

    match serde_json::from_slice::<AppSettings>(&bytes) {
        Ok(settings) => (settings, false),
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring malformed settings: {}", e);
            (AppSettings::default(), false)
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(settings)?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
