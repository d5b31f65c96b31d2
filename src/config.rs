//! Configuration loading and persistence.
//!
//! Handles reading and writing the notepush configuration file and applying
//! `NOTEPUSH_*` environment overrides on top of it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::constants::{DEFAULT_NOTES_URL, HTTP_REQUEST_TIMEOUT};
use crate::notifications::ForegroundPresentation;

/// Configuration for the notepush client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the remote notes service.
    pub notes_url: String,
    /// Project identifier that scopes issued push tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Timeout in seconds for notes service requests.
    pub request_timeout_secs: u64,
    /// How notifications arriving in the foreground are presented.
    pub foreground: ForegroundPresentation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_url: DEFAULT_NOTES_URL.to_string(),
            project_id: None,
            request_timeout_secs: HTTP_REQUEST_TIMEOUT.as_secs(),
            foreground: ForegroundPresentation::default(),
        }
    }
}

impl Config {
    /// Returns the configuration directory path, creating it if necessary.
    ///
    /// Directory selection priority:
    /// 1. `NOTEPUSH_CONFIG_DIR` env var: explicit override
    /// 2. `NOTEPUSH_ENV=test`: `tmp/notepush-test` in the repo
    /// 3. Default: platform config dir (macOS: ~/Library/Application Support/notepush)
    pub fn config_dir() -> Result<PathBuf> {
        let dir = if let Ok(custom_dir) = std::env::var("NOTEPUSH_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else if crate::env::is_test_mode() {
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tmp/notepush-test")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("notepush")
        };
        fs::create_dir_all(&dir).context("Failed to create config directory")?;
        Ok(dir)
    }

    /// Loads configuration from the config directory, with environment
    /// variable overrides. A missing or unreadable file falls back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_dir()?.join("config.json");
        let mut config = Self::load_from(&path).unwrap_or_else(|e| {
            log::debug!("Using default config ({e:#})");
            Self::default()
        });
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// production). Unparseable numeric values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(notes_url) = lookup("NOTEPUSH_NOTES_URL") {
            self.notes_url = notes_url;
        }

        if let Some(project_id) = lookup("NOTEPUSH_PROJECT_ID") {
            self.project_id = Some(project_id).filter(|id| !id.trim().is_empty());
        }

        if let Some(timeout) = lookup("NOTEPUSH_REQUEST_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => log::warn!("Ignoring invalid NOTEPUSH_REQUEST_TIMEOUT: {timeout}"),
            }
        }
    }

    /// Persists the configuration to the config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_dir()?.join("config.json"))
    }

    /// Persists the configuration to an explicit file path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        // Owner read/write only
        #[cfg(unix)]
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

        Ok(())
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.notes_url, DEFAULT_NOTES_URL);
        assert!(config.project_id.is_none());
        assert_eq!(config.request_timeout(), HTTP_REQUEST_TIMEOUT);
        assert!(config.foreground.show_alert);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            project_id: Some("proj-123".to_string()),
            notes_url: "http://localhost:3000".to_string(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"project_id": "abc"}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.project_id.as_deref(), Some("abc"));
        assert_eq!(loaded.notes_url, DEFAULT_NOTES_URL);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NOTEPUSH_NOTES_URL", "http://notes.test"),
            ("NOTEPUSH_PROJECT_ID", "proj-9"),
            ("NOTEPUSH_REQUEST_TIMEOUT", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.notes_url, "http://notes.test");
        assert_eq!(config.project_id.as_deref(), Some("proj-9"));
        assert_eq!(config.request_timeout_secs, 3);
    }

    #[test]
    fn test_invalid_timeout_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| {
            (key == "NOTEPUSH_REQUEST_TIMEOUT").then(|| "soon".to_string())
        });
        assert_eq!(config.request_timeout_secs, HTTP_REQUEST_TIMEOUT.as_secs());
    }

    #[test]
    fn test_blank_project_id_override_clears() {
        let mut config = Config {
            project_id: Some("old".to_string()),
            ..Config::default()
        };
        config.apply_overrides(|key| (key == "NOTEPUSH_PROJECT_ID").then(|| "  ".to_string()));
        assert!(config.project_id.is_none());
    }
}
