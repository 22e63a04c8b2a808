//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::media::{CompressOptions, ThumbnailOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity used by the local CLI
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

fn default_user_id() -> String {
    "local".to_string()
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

/// Where documents and blobs are kept
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("moodlog").to_string_lossy().to_string())
        .unwrap_or_else(|| "./moodlog_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// `data_dir` with a leading `~/` expanded to the home directory
    pub fn data_path(&self) -> PathBuf {
        match (self.data_dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.data_dir),
        }
    }

    /// Directory holding the JSON document files
    pub fn documents_dir(&self) -> PathBuf {
        self.data_path().join("documents")
    }

    /// Directory holding uploaded blobs
    pub fn blobs_dir(&self) -> PathBuf {
        self.data_path().join("blobs")
    }
}

/// Image compression and upload limits
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    #[serde(default = "default_max_dimension")]
    pub max_width: u32,

    #[serde(default = "default_max_dimension")]
    pub max_height: u32,

    #[serde(default = "default_quality")]
    pub quality: u8,

    #[serde(default = "default_thumbnails")]
    pub thumbnails: bool,

    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,

    #[serde(default = "default_thumbnail_quality")]
    pub thumbnail_quality: u8,
}

fn default_max_upload_bytes() -> u64 {
    5 * 1024 * 1024 // 5 MB
}

fn default_max_dimension() -> u32 {
    1080
}

fn default_quality() -> u8 {
    80
}

fn default_thumbnails() -> bool {
    true
}

fn default_thumbnail_size() -> u32 {
    200
}

fn default_thumbnail_quality() -> u8 {
    70
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            max_width: default_max_dimension(),
            max_height: default_max_dimension(),
            quality: default_quality(),
            thumbnails: default_thumbnails(),
            thumbnail_size: default_thumbnail_size(),
            thumbnail_quality: default_thumbnail_quality(),
        }
    }
}

impl MediaConfig {
    pub fn compress_options(&self) -> CompressOptions {
        CompressOptions {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: self.quality,
            thumbnail: self.thumbnails.then_some(ThumbnailOptions {
                max_size: self.thumbnail_size,
                quality: self.thumbnail_quality,
            }),
        }
    }
}

/// Statistics fetch window
#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Most entries fetched when computing statistics
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
}

fn default_fetch_limit() -> usize {
    1000
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            fetch_limit: default_fetch_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("moodlog").join("config.toml")),
            Some(PathBuf::from("./moodlog.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("MOODLOG_USER_ID") {
            self.user.id = id;
        }

        if let Ok(data_dir) = std::env::var("MOODLOG_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Ok(max) = std::env::var("MOODLOG_MAX_UPLOAD_BYTES") {
            if let Ok(bytes) = max.parse() {
                self.media.max_upload_bytes = bytes;
            }
        }

        if let Ok(level) = std::env::var("MOODLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("MOODLOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Moodlog Configuration
#
# Environment variables override these settings:
# - MOODLOG_USER_ID
# - MOODLOG_DATA_DIR
# - MOODLOG_MAX_UPLOAD_BYTES
# - MOODLOG_LOG_LEVEL
# - MOODLOG_LOG_FORMAT

[user]
# Owner of entries written from this machine
id = "local"

[storage]
# Directory for journal documents and uploaded media
data_dir = "~/.local/share/moodlog"

[media]
# Largest blob accepted for upload (bytes)
max_upload_bytes = 5242880

# Images are downscaled to fit these bounds (never upscaled)
max_width = 1080
max_height = 1080

# JPEG quality, 1-100
quality = 80

# Generate thumbnails next to each image
thumbnails = true
thumbnail_size = 200
thumbnail_quality = 70

[stats]
# Most entries read when computing statistics
fetch_limit = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.user.id, "local");
        assert_eq!(config.media.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.stats.fetch_limit, 1000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse("[media]\nquality = 60\nthumbnails = false\n").unwrap();
        assert_eq!(config.media.quality, 60);
        assert_eq!(config.media.max_width, 1080);
        assert!(config.media.compress_options().thumbnail.is_none());
        assert_eq!(config.user.id, "local");
    }

    #[test]
    fn test_compress_options_from_media_config() {
        let options = MediaConfig::default().compress_options();
        assert_eq!(options, CompressOptions::default());
    }

    #[test]
    fn test_storage_dirs() {
        let storage = StorageConfig {
            data_dir: "/var/lib/moodlog".to_string(),
        };
        assert_eq!(storage.documents_dir(), PathBuf::from("/var/lib/moodlog/documents"));
        assert_eq!(storage.blobs_dir(), PathBuf::from("/var/lib/moodlog/blobs"));

        let home = StorageConfig {
            data_dir: "~/journal".to_string(),
        };
        if let Some(dir) = dirs::home_dir() {
            assert_eq!(home.data_path(), dir.join("journal"));
        }
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[media\nquality = ").unwrap();
        assert!(matches!(Config::load(&bad).unwrap_err(), ConfigError::Parse { .. }));
    }
}
