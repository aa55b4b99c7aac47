//! Project marker file.
//!
//! A project directory holds a `snowflake.yml` whose top-level `snowpark`
//! section marks it as deployable.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::error::{DiscoveryError, Result};

/// Parsed marker file.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    path: PathBuf,
    document: serde_yaml::Value,
}

impl ProjectConfig {
    /// Load the marker file from a project directory.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError` if the file exists but cannot be read or
    /// is not valid YAML.
    pub fn load(dir: &Path, marker_file: &str) -> Result<Option<Self>> {
        let path = dir.join(marker_file);
        if !path.is_file() {
            debug!(path = %path.display(), "marker file not found");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| {
            DiscoveryError::ReadInput {
                path: path.clone(),
                source,
            }
        })?;
        let document = if contents.trim().is_empty() {
            serde_yaml::Value::Null
        } else {
            serde_yaml::from_str(&contents).map_err(|source| DiscoveryError::Yaml {
                path: path.clone(),
                source,
            })?
        };

        Ok(Some(Self { path, document }))
    }

    /// Path of the marker file this config was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file declares a Snowpark project.
    pub fn is_snowpark(&self) -> bool {
        self.document.get(constants::PROJECT_SECTION).is_some()
    }

    /// `snowpark.project_name`, or `Unnamed`.
    pub fn project_name(&self) -> &str {
        self.document
            .get(constants::PROJECT_SECTION)
            .and_then(|section| section.get("project_name"))
            .and_then(|name| name.as_str())
            .unwrap_or(constants::UNNAMED_PROJECT)
    }
}
