//! Configuration for the `digraph` command-line driver.
//!
//! Settings come from an optional YAML file:
//!
//! ```yaml
//! strict: false
//! json: false
//! color: auto   # auto | always | never
//! log: warn     # tracing filter used when RUST_LOG is unset
//! ```
//!
//! The file is the one named by `--config`, or `digraph.yaml` in the current
//! directory when present. Command-line flags take precedence over the file.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the configuration file looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "digraph.yaml";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid configuration YAML.
    #[error("invalid config {}: {source}", .path.display())]
    Yaml {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: serde_yaml::Error,
    },
}

/// When to colour terminal output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Let the terminal environment decide
    #[default]
    Auto,
    /// Always colour
    Always,
    /// Never colour
    Never,
}

impl ColorMode {
    /// Resolves the mode for standard output.
    ///
    /// `Auto` colours only a terminal, and honours `NO_COLOR`.
    #[must_use]
    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
        }
    }

    /// Applies this mode to the global `colored` switch.
    pub fn apply(self) {
        match self {
            Self::Auto => colored::control::unset_override(),
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

/// Contents of `digraph.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Abort replay on the first rejected command
    pub strict: bool,

    /// Emit JSON instead of text
    pub json: bool,

    /// Terminal colour mode
    pub color: ColorMode,

    /// Default tracing filter (e.g. "info", "digraph=debug")
    pub log: Option<String>,
}

impl Config {
    /// Loads configuration from `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Loads `explicit` if given, otherwise `digraph.yaml` in `dir` if it
    /// exists, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Fails if the chosen file cannot be read or does not parse. A missing
    /// `explicit` file is an error; a missing default file is not.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }
}
