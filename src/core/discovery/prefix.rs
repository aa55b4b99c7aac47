//! Prefix-grouping discovery.

/// Project key for a changed file under `<prefix>/<name>/...`.
///
/// The file must sit strictly inside the project directory: `steps/foo`
/// on its own does not count. Returns `<prefix>/<name>`.
pub fn project_key(file: &str, prefix: &str) -> Option<String> {
    let mut segments = file.split('/');

    if segments.next()? != prefix {
        return None;
    }
    let name = segments.next().filter(|name| !name.is_empty())?;
    segments.next().filter(|rest| !rest.is_empty())?;

    Some(format!("{}/{}", prefix, name))
}
