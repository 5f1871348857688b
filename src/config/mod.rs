//! Configuration file loading with precedence handling.
//!
//! Precedence chain: defaults, then the TOML config file, then environment
//! variables, then CLI arguments (highest).

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/palletrace/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to the controller log file.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Path to the facility layout JSON file.
    #[serde(default)]
    pub layout_path: Option<PathBuf>,

    /// Travel-time fallback (seconds) for edges with no observations.
    #[serde(default)]
    pub default_travel_seconds: Option<f64>,

    /// Virtual-time increment (seconds) applied per simulation step.
    #[serde(default)]
    pub step_seconds: Option<i64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Path to the controller log file.
    pub log_path: PathBuf,
    /// Path to the facility layout JSON file.
    pub layout_path: PathBuf,
    /// Travel-time fallback (seconds) for edges with no observations.
    pub default_travel_seconds: f64,
    /// Virtual-time increment (seconds) applied per simulation step.
    pub step_seconds: i64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("data/logs.txt"),
            layout_path: PathBuf::from("data/layout.json"),
            default_travel_seconds: 5.0,
            step_seconds: 2,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path for tracing output.
///
/// Returns `~/.local/state/palletrace/palletrace.log` on Unix-like systems,
/// or the platform's state directory elsewhere. Falls back to the current
/// directory if no state directory can be determined.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("palletrace").join("palletrace.log")
    } else {
        PathBuf::from("palletrace.log")
    }
}

/// Resolve default config file path.
///
/// Returns `~/.config/palletrace/config.toml` on Unix, appropriate path on
/// other platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("palletrace").join("config.toml"))
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist (not an error - use
/// defaults). Returns `Err` if the file exists but cannot be read or parsed.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (like CLI `--config`)
/// 2. `PALLETRACE_CONFIG` environment variable
/// 3. Default path `~/.config/palletrace/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("PALLETRACE_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use
/// the default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        log_path: config.log_path.unwrap_or(defaults.log_path),
        layout_path: config.layout_path.unwrap_or(defaults.layout_path),
        default_travel_seconds: config
            .default_travel_seconds
            .unwrap_or(defaults.default_travel_seconds),
        step_seconds: config.step_seconds.unwrap_or(defaults.step_seconds),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `PALLETRACE_LOG`: path to the controller log file
/// - `PALLETRACE_LAYOUT`: path to the facility layout file
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(log_path) = std::env::var("PALLETRACE_LOG") {
        config.log_path = PathBuf::from(log_path);
    }

    if let Ok(layout_path) = std::env::var("PALLETRACE_LAYOUT") {
        config.layout_path = PathBuf::from(layout_path);
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    log_override: Option<PathBuf>,
    layout_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(log_path) = log_override {
        config.log_path = log_path;
    }

    if let Some(layout_path) = layout_override {
        config.layout_path = layout_path;
    }

    config
}
