//! Configuration loading
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`--time-limit-seconds`, `--workers`, ...)
//! 2. Environment variables (`SLIDEWISE_TIME_LIMIT_SECONDS`, `SLIDEWISE_WORKERS`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! # Config File Resolution
//!
//! 1. `--config <path>` (must exist)
//! 2. `SLIDEWISE_CONFIG` environment variable (must exist)
//! 3. `<config dir>/slidewise/config.toml` (optional)
//! 4. Built-in defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SLIDEWISE_CONFIG";
/// Environment override for `search.time_limit_seconds`
pub const TIME_LIMIT_ENV_VAR: &str = "SLIDEWISE_TIME_LIMIT_SECONDS";
/// Environment override for `search.workers`
pub const WORKERS_ENV_VAR: &str = "SLIDEWISE_WORKERS";

pub const DEFAULT_TIME_LIMIT_SECONDS: u64 = 90;
pub const DEFAULT_OUTPUT_FILE: &str = "slideshow.sol";
pub const DEFAULT_SEED: u64 = 0x5EED_51DE;

/// Complete TOML configuration file
///
/// Every table and field is optional; omitted values take built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Optimizer settings (`[search]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Wall-clock budget for the optimizer
    #[serde(default = "default_time_limit_seconds")]
    pub time_limit_seconds: u64,

    /// Parallel perturbation trajectories (None = one per CPU)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Base RNG seed; trajectory `i` uses `seed + i`
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Optional cap on perturbation rounds per trajectory
    #[serde(default)]
    pub max_iterations: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: default_time_limit_seconds(),
            workers: None,
            seed: default_seed(),
            max_iterations: None,
        }
    }
}

/// Output settings (`[output]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Solution file written after the run
    #[serde(default = "default_output_file")]
    pub file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: default_output_file(),
        }
    }
}

/// Logging configuration (`[logging]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
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

fn default_time_limit_seconds() -> u64 {
    DEFAULT_TIME_LIMIT_SECONDS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CliFlag(PathBuf),
    Environment(PathBuf),
    DefaultLocation(PathBuf),
    /// Default-location file existed but could not be used; built-in defaults apply
    UnreadableDefault { path: PathBuf, reason: String },
    BuiltIn,
}

/// Command-line overrides, highest priority
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub time_limit_seconds: Option<u64>,
    pub workers: Option<usize>,
    pub seed: Option<u64>,
    pub max_iterations: Option<u64>,
}

/// Platform config file location (`~/.config/slidewise/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("slidewise").join("config.toml"))
}

/// Pick the config file to read, without reading it
pub fn resolve_config_source(cli_path: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return ConfigSource::CliFlag(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    // Priority 3: Default location, only if present
    match default_config_path() {
        Some(path) if path.exists() => ConfigSource::DefaultLocation(path),
        _ => ConfigSource::BuiltIn,
    }
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    /// Resolve, read, apply environment and CLI overrides, and validate
    ///
    /// # Errors
    ///
    /// - Explicitly named config file (flag or env) is missing or malformed
    /// - Environment override is not a number
    /// - Resolved values fail [`Self::validate`]
    ///
    /// An unreadable file at the default location is not an error: defaults
    /// apply and the returned source is [`ConfigSource::UnreadableDefault`].
    pub fn load(cli_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<(Self, ConfigSource)> {
        let mut source = resolve_config_source(cli_path);
        let mut unreadable = None;
        let mut config = match &source {
            ConfigSource::CliFlag(path) | ConfigSource::Environment(path) => Self::from_file(path)?,
            ConfigSource::DefaultLocation(path) => Self::from_file(path).unwrap_or_else(|e| {
                unreadable = Some((path.clone(), e.to_string()));
                Self::default()
            }),
            ConfigSource::UnreadableDefault { .. } | ConfigSource::BuiltIn => Self::default(),
        };
        // logging may not be up yet; the caller reports this
        if let Some((path, reason)) = unreadable {
            source = ConfigSource::UnreadableDefault { path, reason };
        }

        config.apply_env_overrides()?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok((config, source))
    }

    /// Apply `SLIDEWISE_TIME_LIMIT_SECONDS` and `SLIDEWISE_WORKERS`
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_number::<u64>(TIME_LIMIT_ENV_VAR)? {
            self.search.time_limit_seconds = value;
        }
        if let Some(value) = env_number::<usize>(WORKERS_ENV_VAR)? {
            self.search.workers = Some(value);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(limit) = overrides.time_limit_seconds {
            self.search.time_limit_seconds = limit;
        }
        if let Some(workers) = overrides.workers {
            self.search.workers = Some(workers);
        }
        if let Some(seed) = overrides.seed {
            self.search.seed = seed;
        }
        if let Some(cap) = overrides.max_iterations {
            self.search.max_iterations = Some(cap);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.time_limit_seconds == 0 {
            return Err(Error::Config("time_limit_seconds must be greater than 0".to_string()));
        }
        if self.search.workers == Some(0) {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        if self.output.file.as_os_str().is_empty() {
            return Err(Error::Config("output file name must not be empty".to_string()));
        }
        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
