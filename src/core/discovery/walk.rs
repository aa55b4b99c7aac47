//! Ascending-walk discovery.

use std::path::Path;
use tracing::trace;

/// Find the nearest directory above `file` that contains `marker_file`.
///
/// `file` is relative to `root`. The walk starts at the file's own
/// directory and stops before reaching `root`, so a marker at the root
/// never matches. Returns the project directory relative to `root`.
pub fn find_project_root(root: &Path, file: &str, marker_file: &str) -> Option<String> {
    let mut dir = parent(file);

    while let Some(candidate) = dir {
        let marker = root.join(candidate).join(marker_file);
        trace!(marker = %marker.display(), "checking for marker");
        if marker.is_file() {
            return Some(candidate.to_string());
        }
        dir = parent(candidate);
    }

    None
}

/// Parent of a `/`-separated relative path; `None` once the root is reached.
fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('/')
        .map(|(parent, _)| parent)
        .filter(|parent| !parent.is_empty())
}
