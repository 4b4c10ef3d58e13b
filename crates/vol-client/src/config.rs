//! Client configuration and token storage.
//!
//! Settings are stored as TOML in the platform-specific config folder:
//! - macOS: ~/Library/Application Support/com.volontaires.Volontaires/
//! - Windows: %APPDATA%/volontaires/Volontaires/config/
//! - Linux: ~/.config/volontaires/
//!
//! The bearer token lives in a separate file next to the settings so that
//! `config show` never prints it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use vol_core::DEFAULT_PLACEHOLDER_COMMENT;
use vol_core::listing::DEFAULT_PAGE_SIZE;

use crate::error::{ApiError, Result};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "volontaires";
const APP_NAME: &str = "Volontaires";
const CONFIG_FILENAME: &str = "settings.toml";
const TOKEN_FILENAME: &str = "token";

/// Environment variable overriding [`Settings::api_url`].
pub const ENV_API_URL: &str = "VOLONTAIRES_API_URL";
/// Environment variable providing the bearer token directly.
pub const ENV_TOKEN: &str = "VOLONTAIRES_TOKEN";

pub const DEFAULT_API_URL: &str = "http://localhost:8888";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Persisted client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL, without the `/api` suffix.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Token file location; defaults to `token` next to the settings file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
    /// Rows per page in list views.
    pub page_size: usize,
    /// Comment put on placeholder appointments created in bulk.
    pub placeholder_comment: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_file: None,
            page_size: DEFAULT_PAGE_SIZE,
            placeholder_comment: DEFAULT_PLACEHOLDER_COMMENT.to_string(),
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Applies `VOLONTAIRES_API_URL` when set and non-empty.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_api_url(std::env::var(ENV_API_URL).ok())
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        self
    }

    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_file
            .clone()
            .or_else(|| config_dir().map(|dir| dir.join(TOKEN_FILENAME)))
    }

    /// Load settings from a specific path.
    ///
    /// A missing file gives the defaults; an unreadable or unparseable file
    /// also gives the defaults, with a warning.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    tracing::debug!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to parse settings file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file found at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to a specific path, creating the parent directory.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ApiError::Config(format!("failed to serialize settings: {e}")))?;
        fs::write(path, content)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }
}

fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path to the settings file, if the platform has a config directory.
pub fn settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Reads a stored token. Returns `Ok(None)` when no token was saved.
pub fn read_token(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let token = content.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn write_token(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, token.trim())?;
    restrict_permissions(path)?;
    Ok(())
}

/// Removes the stored token. Removing a missing token is not an error.
pub fn clear_token(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Token lookup order: explicit value, then `VOLONTAIRES_TOKEN`, then the
/// token file.
pub fn resolve_token(explicit: Option<String>, settings: &Settings) -> Result<Option<String>> {
    if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
        return Ok(Some(token.trim().to_string()));
    }
    if let Ok(token) = std::env::var(ENV_TOKEN)
        && !token.trim().is_empty()
    {
        return Ok(Some(token.trim().to_string()));
    }
    match settings.token_path() {
        Some(path) => read_token(&path),
        None => Ok(None),
    }
}
