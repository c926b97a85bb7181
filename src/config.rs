use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the clip catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog storage settings
    pub catalog: CatalogConfig,

    /// Filesystem reconciliation settings
    pub sync: SyncConfig,

    /// Thumbnail generation settings
    pub thumbnails: ThumbnailConfig,

    /// HTTP API settings
    pub server: ServerConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path of the JSON catalog file
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Compare paths byte-for-byte instead of ignoring letter case
    pub case_sensitive_paths: bool,

    /// Follow symbolic links while scanning
    pub follow_links: bool,

    /// Upper bound on a single sync/preview/selective run (seconds)
    pub run_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Generate thumbnails for clips added by a full sync
    pub enabled: bool,

    /// Directory for generated thumbnails
    pub output_dir: PathBuf,

    /// ffmpeg binary to invoke
    pub ffmpeg_path: String,

    /// Offset into the clip for the thumbnail frame (seconds)
    pub seek_seconds: f64,

    /// Thumbnail width in pixels (height keeps aspect ratio)
    pub width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive
    pub level: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/catalog.json"),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            case_sensitive_paths: false,
            follow_links: false,
            run_timeout_seconds: None,
        }
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("./data/thumbnails"),
            ffmpeg_path: "ffmpeg".to_string(),
            seek_seconds: 1.0,
            width: 320,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            sync: SyncConfig::default(),
            thumbnails: ThumbnailConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, falling back to
    /// environment overrides on top of defaults
    pub fn load() -> Result<Self> {
        let config_paths = [
            "bjj-catalog.toml",
            "config/bjj-catalog.toml",
            "/etc/bjj-catalog/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config file {}: {}", path, e))?;
        let config = toml::from_str(&config_str)?;
        tracing::info!("📄 Loaded configuration from: {}", path);
        Ok(config)
    }

    /// Defaults with environment variable overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("BJJ_CATALOG_PATH") {
            config.catalog.path = PathBuf::from(path);
        }

        if let Ok(dir) = std::env::var("BJJ_CATALOG_THUMBNAIL_DIR") {
            config.thumbnails.output_dir = PathBuf::from(dir);
        }

        if let Ok(port) = std::env::var("BJJ_CATALOG_PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| anyhow!("Invalid BJJ_CATALOG_PORT {}: {}", port, e))?;
        }

        if let Ok(level) = std::env::var("BJJ_CATALOG_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(flag) = std::env::var("BJJ_CATALOG_CASE_SENSITIVE") {
            config.sync.case_sensitive_paths = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog.path.as_os_str().is_empty() {
            return Err(anyhow!("catalog.path must not be empty"));
        }

        if self.sync.run_timeout_seconds == Some(0) {
            return Err(anyhow!("sync.run_timeout_seconds must be greater than 0"));
        }

        if self.thumbnails.enabled {
            if self.thumbnails.width == 0 {
                return Err(anyhow!("thumbnails.width must be greater than 0"));
            }
            if self.thumbnails.seek_seconds < 0.0 {
                return Err(anyhow!("thumbnails.seek_seconds must not be negative"));
            }
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "BJJ Clip Catalog Configuration:\n\
            - Catalog: {}\n\
            - Case-sensitive paths: {}\n\
            - Follow links: {}\n\
            - Run timeout: {}\n\
            - Thumbnails: {} ({})",
            self.catalog.path.display(),
            self.sync.case_sensitive_paths,
            self.sync.follow_links,
            self.sync
                .run_timeout_seconds
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "none".to_string()),
            if self.thumbnails.enabled { "enabled" } else { "disabled" },
            self.thumbnails.output_dir.display(),
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_catalog_path(mut self, path: PathBuf) -> Self {
        self.config.catalog.path = path;
        self
    }

    pub fn with_case_sensitive_paths(mut self, enable: bool) -> Self {
        self.config.sync.case_sensitive_paths = enable;
        self
    }

    pub fn with_run_timeout(mut self, seconds: u64) -> Self {
        self.config.sync.run_timeout_seconds = Some(seconds);
        self
    }

    pub fn with_thumbnail_dir(mut self, dir: PathBuf) -> Self {
        self.config.thumbnails.output_dir = dir;
        self
    }

    pub fn enable_thumbnails(mut self, enable: bool) -> Self {
        self.config.thumbnails.enabled = enable;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
