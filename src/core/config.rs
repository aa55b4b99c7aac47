//! Configuration file management.
//!
//! Reads the optional `.snowdeploy.toml` at the scan root and merges
//! command-line overrides on top of it.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::core::discovery::Strategy;
use crate::core::dispatch::FailurePolicy;
use crate::core::environment::ConnectionStyle;
use crate::error::{ConfigError, Result};

/// Settings for a deployment run.
///
/// Every section is optional in the file; missing values fall back to
/// the defaults in [`constants`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub secrets: SecretsConfig,
    pub connection: ConnectionConfig,
    pub deploy: DeployConfig,
}

/// `[discovery]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// How changed projects are found
    pub strategy: Strategy,
    /// File marking a project root (walk strategy, and loaded before deploy)
    pub marker_file: String,
    /// First path segment grouping projects in the prefix strategy
    pub prefix: String,
    /// Directory names never treated as part of a project
    pub ignore: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            marker_file: constants::MARKER_FILE.to_string(),
            prefix: constants::PROJECT_PREFIX.to_string(),
            ignore: constants::IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `[secrets]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Secret holding the client credentials
    pub name: String,
    /// Secret store region
    pub region: String,
    /// Local JSON file used instead of the remote store
    pub file: Option<PathBuf>,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            name: constants::SECRET_NAME.to_string(),
            region: constants::SECRET_REGION.to_string(),
            file: None,
        }
    }
}

/// `[connection]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    pub user: String,
    pub warehouse: String,
    /// How connection parameters reach the deploy CLI.
    ///
    /// Unset means `env` when a target is given and `flags` otherwise.
    pub style: Option<ConnectionStyle>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            user: constants::DEFAULT_USER.to_string(),
            warehouse: constants::DEFAULT_WAREHOUSE.to_string(),
            style: None,
        }
    }
}

/// `[deploy]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// External deploy CLI
    pub snow_bin: String,
    pub on_failure: FailurePolicy,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            snow_bin: constants::SNOW_BIN.to_string(),
            on_failure: FailurePolicy::default(),
        }
    }
}

/// Values given on the command line, applied over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub strategy: Option<Strategy>,
    pub marker_file: Option<String>,
    pub prefix: Option<String>,
    pub secrets_file: Option<PathBuf>,
    pub snow_bin: Option<String>,
    pub style: Option<ConnectionStyle>,
    pub fail_fast: bool,
}

impl Config {
    /// Path to the configuration file under `root`.
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(constants::CONFIG_FILE)
    }

    /// Load configuration from `<root>/.snowdeploy.toml`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed, or
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::config_path(root);
        if !path.is_file() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;

        Ok(config)
    }

    /// Apply command-line overrides, then re-validate.
    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(strategy) = overrides.strategy {
            self.discovery.strategy = strategy;
        }
        if let Some(marker) = overrides.marker_file {
            self.discovery.marker_file = marker;
        }
        if let Some(prefix) = overrides.prefix {
            self.discovery.prefix = prefix;
        }
        if let Some(file) = overrides.secrets_file {
            self.secrets.file = Some(file);
        }
        if let Some(bin) = overrides.snow_bin {
            self.deploy.snow_bin = bin;
        }
        if let Some(style) = overrides.style {
            self.connection.style = Some(style);
        }
        if overrides.fail_fast {
            self.deploy.on_failure = FailurePolicy::FailFast;
        }

        self.validate()
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        require_segment("discovery.marker_file", &self.discovery.marker_file)?;
        require_segment("discovery.prefix", &self.discovery.prefix)?;
        require("secrets.name", &self.secrets.name)?;
        require("secrets.region", &self.secrets.region)?;
        require("connection.user", &self.connection.user)?;
        require("connection.warehouse", &self.connection.warehouse)?;
        require("deploy.snow_bin", &self.deploy.snow_bin)?;
        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must not be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Non-empty and a single path segment.
fn require_segment(field: &'static str, value: &str) -> Result<()> {
    require(field, value)?;
    if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("'{}' must be a single path segment", value),
        }
        .into());
    }
    Ok(())
}
