//! Local JSON secrets file.

use std::path::PathBuf;
use tracing::debug;

use super::{SecretBundle, SecretSource};
use crate::error::{Result, SecretError};

/// Reads the secret payload from a file instead of a remote store.
///
/// The file holds the same JSON object the store would return; the
/// secret name only labels errors.
pub struct SecretsFile {
    path: PathBuf,
}

impl SecretsFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SecretSource for SecretsFile {
    fn fetch(&self, name: &str) -> Result<SecretBundle> {
        debug!(path = %self.path.display(), name, "reading secrets file");

        let payload = std::fs::read_to_string(&self.path).map_err(|e| {
            SecretError::Fetch(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        SecretBundle::from_json(name, &payload)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
