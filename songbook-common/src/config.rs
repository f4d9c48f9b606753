//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Built-in defaults (fallback)
//!
//! A missing TOML file is not an error and defaults apply. A file that
//! exists but cannot be read or parsed is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the base directory
pub const ENV_BASE_DIR: &str = "SONGBOOK_BASE_DIR";
/// Environment variable overriding the listen host
pub const ENV_HOST: &str = "SONGBOOK_HOST";
/// Environment variable overriding the listen port
pub const ENV_PORT: &str = "SONGBOOK_PORT";
/// Environment variable naming the TOML config file
pub const ENV_CONFIG: &str = "SONGBOOK_CONFIG";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SONGS_DIR: &str = "songs";
const DEFAULT_FLAGS_FILE: &str = "flagged.json";

/// Contents of the TOML config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Directory holding the songs directory and the flag file
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Songs directory (relative to `base_dir` unless absolute)
    #[serde(default)]
    pub songs_dir: Option<PathBuf>,

    /// Flag file (relative to `base_dir` unless absolute)
    #[serde(default)]
    pub flags_file: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
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

fn default_log_level() -> String {
    "info".to_string()
}

/// Steps run after every content mutation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_build_enabled")]
    pub enabled: bool,

    #[serde(default = "default_build_steps")]
    pub steps: Vec<BuildStep>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            enabled: default_build_enabled(),
            steps: default_build_steps(),
        }
    }
}

fn default_build_enabled() -> bool {
    true
}

fn default_build_steps() -> Vec<BuildStep> {
    vec![BuildStep::Command {
        program: "npm".to_string(),
        args: vec!["run".to_string(), "build:songs".to_string()],
    }]
}

/// One build step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildStep {
    /// External program, run in the base directory
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Built-in songs index builder (`output_dir` relative to the base directory)
    Index { output_dir: PathBuf },
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub songs_dir: PathBuf,
    pub flags_file: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub build: BuildConfig,
}

impl Config {
    /// Merge CLI overrides, environment and TOML values over the defaults.
    pub fn resolve(toml_config: TomlConfig, overrides: ConfigOverrides) -> Result<Self> {
        let base_dir = overrides
            .base_dir
            .or_else(|| env_value(ENV_BASE_DIR).map(PathBuf::from))
            .or(toml_config.base_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let host = overrides
            .host
            .or_else(|| env_value(ENV_HOST))
            .or(toml_config.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match overrides.port {
            Some(port) => port,
            None => match env_value(ENV_PORT) {
                Some(raw) => raw.parse::<u16>().map_err(|e| {
                    Error::Config(format!("Invalid {} value {:?}: {}", ENV_PORT, raw, e))
                })?,
                None => toml_config.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let songs_dir = base_dir.join(
            toml_config
                .songs_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SONGS_DIR)),
        );
        let flags_file = base_dir.join(
            toml_config
                .flags_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FLAGS_FILE)),
        );

        Ok(Self {
            base_dir,
            songs_dir,
            flags_file,
            host,
            port,
            log_level: toml_config.logging.level,
            build: toml_config.build,
        })
    }
}

/// Config file path: CLI argument, then environment, then the platform
/// config directory (`<config_dir>/songbook/config.toml`).
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env_value(ENV_CONFIG) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|d| d.join("songbook").join("config.toml"))
}

/// Read and parse a TOML config file. `Ok(None)` when the file is absent.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )))
        }
    };

    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    Ok(Some(config))
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
