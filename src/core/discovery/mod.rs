//! Changed-project discovery.
//!
//! Turns a changed-file list (or a manifest) into the sorted, deduplicated
//! set of project directories to deploy.
//!
//! ## Strategies
//!
//! - **walk**: nearest ancestor directory containing the marker file.
//! - **prefix**: fixed `<prefix>/<name>/...` grouping, no filesystem access.
//! - **manifest**: explicit `projects:` list from a YAML file.
//!
//! Exactly one strategy runs per deployment, selected by configuration.

mod manifest;
mod prefix;
mod walk;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::core::changes;
use crate::core::config::DiscoveryConfig;
use crate::error::Result;

pub use manifest::read_manifest;
pub use prefix::project_key;
pub use walk::find_project_root;

/// Discovery strategy name, as used in config files and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Walk up from each changed file to the nearest marker file
    #[default]
    Walk,
    /// Group changed files by `<prefix>/<name>/`
    Prefix,
    /// Read project paths from a manifest
    Manifest,
}

impl Strategy {
    /// Display name for user-facing messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Prefix => "prefix",
            Self::Manifest => "manifest",
        }
    }
}

/// Project directories found by a discovery run.
///
/// Keys are `/`-separated paths relative to the scan root, kept in
/// lexicographic order. Each project carries the changed files that
/// selected it (empty for manifest discovery).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovered {
    projects: BTreeMap<String, Vec<String>>,
}

impl Discovered {
    /// Record a project, optionally with the changed file that selected it.
    pub fn insert(&mut self, project: impl Into<String>, file: Option<&str>) {
        let files = self.projects.entry(project.into()).or_default();
        if let Some(file) = file {
            if !files.iter().any(|f| f == file) {
                files.push(file.to_string());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Project paths in deployment order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    /// Projects with the changed files attributed to each.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.projects
            .iter()
            .map(|(path, files)| (path.as_str(), files.as_slice()))
    }
}

/// A configured discovery strategy.
#[derive(Debug, Clone)]
pub enum Discovery {
    Walk { marker_file: String, ignore: Vec<String> },
    Prefix { prefix: String, ignore: Vec<String> },
    Manifest,
}

impl Discovery {
    /// Build the strategy selected in configuration.
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        match config.strategy {
            Strategy::Walk => Self::Walk {
                marker_file: config.marker_file.clone(),
                ignore: config.ignore.clone(),
            },
            Strategy::Prefix => Self::Prefix {
                prefix: config.prefix.clone(),
                ignore: config.ignore.clone(),
            },
            Strategy::Manifest => Self::Manifest,
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Walk { .. } => Strategy::Walk,
            Self::Prefix { .. } => Strategy::Prefix,
            Self::Manifest => Strategy::Manifest,
        }
    }

    /// Discover projects from `input`.
    ///
    /// `input` is a changed-files list for walk and prefix discovery and a
    /// YAML manifest for manifest discovery.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError` if the input cannot be read or parsed.
    pub fn discover(&self, root: &Path, input: &Path) -> Result<Discovered> {
        debug!(
            strategy = self.strategy().name(),
            root = %root.display(),
            input = %input.display(),
            "discovering projects"
        );

        let discovered = match self {
            Self::Walk { .. } | Self::Prefix { .. } => {
                let files = changes::read_changed_files(input, root)?;
                debug!(files = files.len(), "changed files read");
                self.discover_files(root, files.iter().map(String::as_str))
            }
            Self::Manifest => read_manifest(input)?,
        };

        debug!(projects = discovered.len(), "discovery finished");
        Ok(discovered)
    }

    /// Discover projects from already-normalized changed paths.
    ///
    /// Manifest discovery ignores changed files and returns nothing here.
    pub fn discover_files<'a>(
        &self,
        root: &Path,
        files: impl IntoIterator<Item = &'a str>,
    ) -> Discovered {
        let mut discovered = Discovered::default();

        for file in files {
            let project = match self {
                Self::Walk { marker_file, ignore } => {
                    if changes::is_ignored(file, ignore) {
                        continue;
                    }
                    find_project_root(root, file, marker_file)
                }
                Self::Prefix { prefix, ignore } => {
                    if changes::is_ignored(file, ignore) {
                        continue;
                    }
                    project_key(file, prefix)
                }
                Self::Manifest => None,
            };

            match project {
                Some(project) => discovered.insert(project, Some(file)),
                None => debug!(file, "no project for changed file"),
            }
        }

        discovered
    }
}
