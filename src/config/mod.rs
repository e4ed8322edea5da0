//! Configuration module for websearch-rs
//!
//! Handles loading settings from YAML files and environment variables.
//! Settings are loaded once in `main` and handed to the components that need
//! them; there is no global instance.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "WEBSEARCH_SETTINGS_PATH";

/// Load settings from `path`, or defaults when there is none,
/// then apply environment overrides
pub fn load_from(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    settings.merge_env();
    Ok(settings)
}

/// Find a settings file
pub fn locate() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(SETTINGS_PATH_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("websearch-rs/settings.yml"));
    }

    paths.into_iter().find(|p| p.exists())
}
