//! Manifest-driven discovery.

use serde::Deserialize;
use std::path::Path;

use super::Discovered;
use crate::error::{DiscoveryError, Result};

/// Manifest document: `projects:` lists project paths relative to the root.
#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    projects: Vec<String>,
}

/// Read project paths from a YAML manifest.
///
/// Paths are taken verbatim (surrounding whitespace and trailing `/`
/// aside), deduplicated and sorted. Nothing is checked on disk here; a
/// missing project surfaces when its marker file is loaded.
///
/// # Errors
///
/// Returns `DiscoveryError::ReadInput` or `DiscoveryError::Yaml`.
pub fn read_manifest(path: &Path) -> Result<Discovered> {
    let contents = std::fs::read_to_string(path).map_err(|source| DiscoveryError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&contents).map_err(|source| {
        DiscoveryError::Yaml {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

fn parse_manifest(contents: &str) -> std::result::Result<Discovered, serde_yaml::Error> {
    let manifest: Manifest = if contents.trim().is_empty() {
        Manifest::default()
    } else {
        serde_yaml::from_str(contents)?
    };

    let mut discovered = Discovered::default();
    for project in &manifest.projects {
        let project = project.trim().trim_end_matches('/');
        if !project.is_empty() {
            discovered.insert(project, None);
        }
    }
    Ok(discovered)
}
