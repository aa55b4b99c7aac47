//! Changed-file input.
//!
//! Reads the newline-delimited list produced by the CI change-detection
//! step and normalizes each entry to a `/`-separated path relative to the
//! scan root.

use std::collections::BTreeSet;
use std::path::{Component, Path};
use tracing::debug;

use crate::error::{DiscoveryError, Result};

/// Read a changed-files list.
///
/// Blank lines are ignored, duplicates collapse. Entries that do not lie
/// under `root` are dropped.
///
/// # Errors
///
/// Returns `DiscoveryError::ReadInput` if the file cannot be read.
pub fn read_changed_files(path: &Path, root: &Path) -> Result<BTreeSet<String>> {
    let contents = std::fs::read_to_string(path).map_err(|source| DiscoveryError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_changed_files(&contents, root))
}

/// Parse changed-file list contents. See [`read_changed_files`].
pub fn parse_changed_files(contents: &str, root: &Path) -> BTreeSet<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let normalized = normalize(line, root);
            if normalized.is_none() {
                debug!(path = line, "changed file outside root, dropping");
            }
            normalized
        })
        .collect()
}

/// Normalize a changed path relative to `root`.
///
/// Backslashes become `/`, `.` components vanish, absolute paths are made
/// relative to `root`. Returns `None` for paths that escape the root or
/// are empty.
pub fn normalize(raw: &str, root: &Path) -> Option<String> {
    let unified = raw.trim().replace('\\', "/");
    let path = Path::new(&unified);

    let relative = if path.is_absolute() {
        path.strip_prefix(root).ok()?
    } else {
        path
    };

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => segments.push(part.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// Whether any directory segment of `path` is in the ignore list.
pub fn is_ignored(path: &str, ignore: &[String]) -> bool {
    path.split('/').any(|segment| ignore.iter().any(|i| i == segment))
}
