//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is read once at startup from a TOML file and is
//! immutable afterwards. Every section is optional; anything missing falls
//! back to compiled defaults.
//!
//! Config file priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`GKAM_CONFIG`)
//! 3. Per-user config file (`<config_dir>/gkam/config.toml`)
//! 4. Compiled defaults (fallback, no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "GKAM_CONFIG";

/// Default HTTP bind address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5730";

/// Default maximum number of items in one album (transport media-group limit)
pub const DEFAULT_MAX_GROUP_SIZE: usize = 10;

/// Root of the TOML configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub albums: AlbumConfig,
    pub signals: SignalConfig,
    pub enrichment: EnrichmentConfig,
    pub socials: SocialsConfig,
    pub events: EventsConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where the lead item is placed when media is split into albums
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadPlacement {
    /// Lead item opens every album
    #[default]
    EveryGroup,
    /// Lead item opens only the first album
    FirstGroupOnly,
}

/// Album partitioning settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlbumConfig {
    /// Maximum items per album, lead item included
    pub max_group_size: usize,
    pub lead_placement: LeadPlacement,
}

impl Default for AlbumConfig {
    fn default() -> Self {
        Self {
            max_group_size: DEFAULT_MAX_GROUP_SIZE,
            lead_placement: LeadPlacement::EveryGroup,
        }
    }
}

/// Text commands recognized as control signals
///
/// Matching is case-insensitive on the trimmed message text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalConfig {
    /// Words that advance a stage waiting for "next"/"done"/"confirm"
    pub advance: Vec<String>,
    /// Commands that restart the session from any stage
    pub restart: Vec<String>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            advance: ["next", "done", "confirm", "✅ next", "✅ done"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            restart: vec!["/restart".to_string(), "/start".to_string()],
        }
    }
}

impl SignalConfig {
    pub fn is_advance(&self, text: &str) -> bool {
        matches_any(&self.advance, text)
    }

    pub fn is_restart(&self, text: &str) -> bool {
        matches_any(&self.restart, text)
    }
}

fn matches_any(words: &[String], text: &str) -> bool {
    let text = text.trim().to_lowercase();
    !text.is_empty() && words.iter().any(|w| w.trim().to_lowercase() == text)
}

/// Follower-count enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Profile pages are read up to this many bytes
    pub max_body_bytes: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 6,
            user_agent: "Mozilla/5.0 (compatible; GatekeepersAlbumMaker/1.0)".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// One social platform recognized by URL host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformConfig {
    /// Display label, also the key in the session's socials map
    pub label: String,
    /// Hosts (and their subdomains) belonging to the platform
    pub hosts: Vec<String>,
}

impl PlatformConfig {
    fn new(label: &str, hosts: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
        }
    }
}

/// Social link classification settings
///
/// `platforms` order is also the line order of the summary template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SocialsConfig {
    pub fallback_label: String,
    pub platforms: Vec<PlatformConfig>,
}

impl Default for SocialsConfig {
    fn default() -> Self {
        Self {
            fallback_label: "other".to_string(),
            platforms: vec![
                PlatformConfig::new("YouTube", &["youtube.com", "youtu.be"]),
                PlatformConfig::new("Instagram", &["instagram.com"]),
                PlatformConfig::new("TikTok", &["tiktok.com"]),
            ],
        }
    }
}

/// Event bus settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EventsConfig {
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl TomlConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, degrading to defaults when the file
    /// is missing or unreadable
    ///
    /// A file that exists but does not parse or validate is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info!("No config file found, using compiled defaults");
            return Ok(Self::default());
        };

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content).map_err(|e| {
                    Error::Config(format!("{}: {}", path.display(), e))
                })?;
                info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!(
                    "Config file {} not readable ({}), using compiled defaults",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        let cap = self.albums.max_group_size;
        if cap == 0 {
            return Err(Error::Config(
                "albums.max_group_size must be at least 1".to_string(),
            ));
        }
        if cap < 2 && self.albums.lead_placement == LeadPlacement::EveryGroup {
            return Err(Error::Config(
                "albums.max_group_size must be at least 2 when the lead item opens every album"
                    .to_string(),
            ));
        }
        if self.socials.fallback_label.trim().is_empty() {
            return Err(Error::Config(
                "socials.fallback_label must not be empty".to_string(),
            ));
        }
        for platform in &self.socials.platforms {
            if platform.label.trim().is_empty() {
                return Err(Error::Config("social platform label must not be empty".to_string()));
            }
            if platform.hosts.iter().all(|h| h.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "social platform {} needs at least one host",
                    platform.label
                )));
            }
        }
        if self.events.capacity == 0 {
            return Err(Error::Config("events.capacity must be at least 1".to_string()));
        }
        if self.enrichment.timeout_secs == 0 {
            return Err(Error::Config(
                "enrichment.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.enrichment.max_body_bytes == 0 {
            return Err(Error::Config(
                "enrichment.max_body_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolves which config file (if any) a module should read
pub struct ConfigResolver {
    module_name: String,
}

impl ConfigResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
        }
    }

    /// Resolve config file path following the priority order in the module docs
    ///
    /// Returns `None` when no source names a file and no per-user file exists.
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Per-user config file
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Some(path);
            }
        }

        // Priority 4: compiled defaults
        tracing::debug!("{}: no config file source", self.module_name);
        None
    }
}

/// Per-user config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gkam").join("config.toml"))
}
