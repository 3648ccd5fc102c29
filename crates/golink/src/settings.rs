use std::path::{Path, PathBuf};

use golink_core::DEFAULT_LINK_NAME;
use golink_dl::{DEFAULT_CATALOG_URL, DEFAULT_DEV_ARCHIVE_URL, DEFAULT_DOWNLOAD_HOST};
use golink_platform::AppPaths;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_link_name")]
    pub link_name: String,

    #[serde(default = "default_download_host")]
    pub download_host: String,

    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    #[serde(default = "default_dev_archive_url")]
    pub dev_archive_url: String,

    /// Connect and per-read timeout for HTTP requests.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Budget for a whole run; `0` disables it.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_link_name() -> String {
    DEFAULT_LINK_NAME.to_string()
}

fn default_download_host() -> String {
    DEFAULT_DOWNLOAD_HOST.to_string()
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_dev_archive_url() -> String {
    DEFAULT_DEV_ARCHIVE_URL.to_string()
}

fn default_http_timeout() -> u64 {
    30
}

fn default_operation_timeout() -> u64 {
    30 * 60
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            link_name: default_link_name(),
            download_host: default_download_host(),
            catalog_url: default_catalog_url(),
            dev_archive_url: default_dev_archive_url(),
            http_timeout_secs: default_http_timeout(),
            operation_timeout_secs: default_operation_timeout(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

#[derive(Debug, Error)]
#[error("malformed settings file {}: {source}", path.display())]
pub struct SettingsError {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
}

impl Settings {
    /// Settings from the platform config directory, or defaults when the
    /// file is missing or unreadable.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the file exists but does not parse.
    /// The caller reports it once logging is up.
    pub fn load(paths: &AppPaths) -> Result<Self, SettingsError> {
        Self::load_from(&paths.settings_file())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Ok(Self::default());
        };
        serde_json::from_str(&content).map_err(|source| SettingsError {
            path: path.to_path_buf(),
            source,
        })
    }
}
