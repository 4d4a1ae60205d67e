//! Bootstrap configuration loading
//!
//! The TOML file only carries bootstrap concerns (database location, listen
//! address, logging, ranking policy). A missing file is never fatal: the
//! service logs a warning and starts with compiled defaults.
//!
//! Config file resolution order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config file (`<config_dir>/fbswarm/config.toml`)
//! 4. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FBSWARM_CONFIG";

/// Default HTTP port for the swarm analysis service
pub const DEFAULT_PORT: u16 = 5790;

/// Default cap applied to top-priority requests
pub const DEFAULT_MAX_TOP_LIMIT: i64 = 100;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Interface the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            bind_address: default_bind_address(),
            port: default_port(),
            logging: LoggingConfig::default(),
            ranking: RankingConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// What the ranking store does when an already-ranked item is analyzed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescorePolicy {
    /// Leave the stored rank and consensus score untouched
    #[default]
    KeepExisting,
    /// Overwrite the stored consensus score (rank is still never reassigned)
    RefreshScore,
}

/// Priority ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default)]
    pub rescore_policy: RescorePolicy,

    /// Upper bound on the number of entries a top-priorities request returns
    #[serde(default = "default_max_top_limit")]
    pub max_top_limit: i64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            rescore_policy: RescorePolicy::default(),
            max_top_limit: default_max_top_limit(),
        }
    }
}

/// Agent scoring configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Fixed seed for the jitter generator; entropy-seeded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_top_limit() -> i64 {
    DEFAULT_MAX_TOP_LIMIT
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fbswarm"))
        .unwrap_or_else(|| PathBuf::from("./fbswarm_data"))
        .join("fbswarm.db")
}

/// Locate the config file to load, if any
///
/// Returns `None` when neither an explicit path nor a per-user file exists;
/// the caller then runs on compiled defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config file
    default_config_path().filter(|p| p.exists())
}

/// `<config_dir>/fbswarm/config.toml`, whether or not it exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fbswarm").join("config.toml"))
}

/// Load bootstrap configuration
///
/// A missing file degrades to defaults with a warning. A file that exists but
/// does not parse is a configuration error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    if config.ranking.max_top_limit < 1 {
        return Err(Error::Config(format!(
            "ranking.max_top_limit must be at least 1, got {}",
            config.ranking.max_top_limit
        )));
    }

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write configuration back out as TOML
///
/// Writes to `<path>.tmp` and renames over the target, so a concurrent
/// reader sees either the old file or the new one, never a torn write.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
