//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `hudtick-config.yaml` next to the
//! engine binary. Every field has a default, so an empty or missing file
//! yields a working configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "HUDTICK_CONFIG";

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "hudtick-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HudConfig {
    /// Scheduler policy values.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Effect feed settings.
    #[serde(default)]
    pub effects: EffectsConfig,

    /// Host loop settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HudConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reports an empty document as a null value.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The config path: `HUDTICK_CONFIG` when set, else the default file name.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
    }
}

/// Scheduler policy values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// How long a warning title stays up before its reset, in seconds.
    ///
    /// Also the offset between a warning and the reset that cancellation
    /// removes alongside it.
    #[serde(default = "default_warning_seconds")]
    pub warning_seconds: u64,

    /// Whether the full-inventory warning reschedules itself.
    #[serde(default)]
    pub repeat_full_inventory_warning: bool,

    /// Delay before a repeated warning, in seconds.
    #[serde(default = "default_repeat_interval_seconds")]
    pub repeat_interval_seconds: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            warning_seconds: default_warning_seconds(),
            repeat_full_inventory_warning: false,
            repeat_interval_seconds: default_repeat_interval_seconds(),
        }
    }
}

/// Effect feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EffectsConfig {
    /// Rewrite roman numerals in effect labels to plain digits.
    #[serde(default)]
    pub replace_roman_numerals: bool,

    /// File holding the raw footer text, re-read every refresh.
    #[serde(default)]
    pub footer_path: Option<PathBuf>,

    /// Ticks between effect feed refreshes.
    #[serde(default = "default_refresh_interval_ticks")]
    pub refresh_interval_ticks: u64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            replace_roman_numerals: false,
            footer_path: None,
            refresh_interval_ticks: default_refresh_interval_ticks(),
        }
    }
}

/// Host loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks; run until shutdown when absent.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset.
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

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_warning_seconds() -> u64 {
    4
}

const fn default_repeat_interval_seconds() -> i64 {
    10
}

const fn default_refresh_interval_ticks() -> u64 {
    20
}

const fn default_tick_interval_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}
