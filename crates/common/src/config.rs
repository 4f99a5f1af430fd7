//! Application configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{CampusCardError, CampusCardResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// JSON file holding the student records of every tenant.
    pub data_file: PathBuf,

    /// HTTP server settings.
    pub server: ServerConfig,

    /// Card rendering settings.
    pub render: RenderConfig,

    /// Photo fetching settings.
    pub fetch: FetchConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the export API listens on.
    pub bind: SocketAddr,
}

/// Card rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Theme used when a request does not name one ("classic" or "premium").
    pub default_theme: String,

    /// Footer line printed on every card.
    pub validity_text: String,

    /// TrueType fonts used for card text.
    pub fonts: FontPaths,
}

/// Explicit font file locations. Unset entries fall back to system fonts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontPaths {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
}

/// Photo fetching limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout for remote photos.
    pub timeout_secs: u64,

    /// Photos larger than this are rejected.
    pub max_photo_bytes: u64,

    /// Directory that local photo references (plain paths and `file://`
    /// URLs) must resolve inside. Unset: only http(s) photos are fetched.
    pub photo_root: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "campuscard_export=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            server: ServerConfig::default(),
            render: RenderConfig::default(),
            fetch: FetchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_theme: "classic".to_string(),
            validity_text: "Valid for Academic Year 2024-2025".to_string(),
            fonts: FontPaths::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_photo_bytes: 10 * 1024 * 1024,
            photo_root: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from `path`, falling back to defaults when it is missing
    /// or unusable. The error behind a fallback is returned so it can be
    /// reported once logging is initialized.
    pub fn load_or_default(path: &Path) -> (Self, Option<CampusCardError>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load_from(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> CampusCardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            CampusCardError::config(format!("invalid config {}: {e}", path.display()))
        })
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("campuscard").join("config.json")
}

/// Default student records file.
fn default_data_file() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("campuscard").join("students.json")
}
