//! Project-local configuration.
//!
//! [`Settings`] is resolved once from the command line and the process
//! environment; nothing else in the crate reads ambient state. The
//! configuration file it points to is parsed into a [`ProjectConfig`],
//! which describes the commands the project exposes.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Supported configuration file names, in lookup order
pub const CONFIG_FILES: [&str; 3] = [".appctl.json", ".appctl.yml", ".appctl.yaml"];

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "APPCTL_CONFIG_PATH";

/// Environment used when neither the command line nor the file sets one
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Invocation-wide settings resolved at the entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory commands run in and relative paths resolve against.
    pub working_dir: PathBuf,
    /// Configuration file to load.
    pub config_path: PathBuf,
    /// Environment requested on the command line.
    pub environment: Option<String>,
}

impl Settings {
    /// Resolves settings from explicit inputs.
    ///
    /// The configuration path is taken from `config_arg`, then `config_env`,
    /// then the first of [`CONFIG_FILES`] that exists in `working_dir`.
    pub fn new(
        working_dir: PathBuf,
        config_arg: Option<PathBuf>,
        config_env: Option<String>,
        environment: Option<String>,
    ) -> Self {
        let config_path = config_arg
            .or_else(|| config_env.filter(|s| !s.trim().is_empty()).map(PathBuf::from))
            .map(|path| working_dir.join(path))
            .unwrap_or_else(|| find_config_file(&working_dir));

        Self { working_dir, config_path, environment }
    }

    /// Resolves settings from the process environment.
    pub fn from_env(config_arg: Option<PathBuf>, environment: Option<String>) -> Result<Self> {
        let working_dir = std::env::current_dir()?;
        let config_env = std::env::var(CONFIG_PATH_ENV).ok();
        Ok(Self::new(working_dir, config_arg, config_env, environment))
    }

    /// Effective environment name for this invocation.
    pub fn environment(&self, config: &ProjectConfig) -> String {
        self.environment
            .clone()
            .or_else(|| config.environment.clone())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }
}

fn find_config_file(working_dir: &Path) -> PathBuf {
    CONFIG_FILES
        .iter()
        .map(|file| working_dir.join(file))
        .find(|path| path.exists())
        .unwrap_or_else(|| working_dir.join(CONFIG_FILES[0]))
}

/// A command exposed by the project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    /// Shell command line executed for the command.
    pub run: String,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub see: Option<String>,
    /// Option usage lines and their descriptions, shown in help.
    #[serde(default)]
    pub options: IndexMap<String, String>,
    /// Minimum number of positional arguments.
    #[serde(default)]
    pub args: usize,
    /// Extra environment variables for the command.
    #[serde(default)]
    pub env: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub environment: Option<String>,
    /// Commands, in the order they are tried by the dispatcher.
    #[serde(default)]
    pub commands: IndexMap<String, CommandConfig>,
}

/// Parses configuration content, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither valid JSON nor valid YAML
///   for the expected schema
pub fn parse_config(content: &str) -> Result<ProjectConfig> {
    match serde_json::from_str(content) {
        Ok(config) => Ok(config),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}"))),
    }
}

/// Loads the configuration file named by `settings`.
///
/// # Errors
/// * `Error::ConfigError` if the file does not exist or cannot be parsed
pub fn load_config(settings: &Settings) -> Result<ProjectConfig> {
    let path = &settings.config_path;
    if !path.is_file() {
        return Err(Error::ConfigError(format!(
            "No configuration file found at '{}' (tried: {})",
            path.display(),
            CONFIG_FILES.join(", ")
        )));
    }

    debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
