//! Secret resolution.
//!
//! Fetches the per-client credential bundle from a secret store.
//!
//! ## Sources
//!
//! - **AWS Secrets Manager**: Feature-gated (`aws`, on by default).
//! - **File**: a local JSON file with the same payload, for local runs.
//!
//! ## Adding a New Source
//!
//! 1. Implement the `SecretSource` trait
//! 2. Add the implementation in a new file
//! 3. Select it in `source_from_config`

#[cfg(feature = "aws")]
pub mod aws;
mod file;

use std::collections::BTreeMap;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::config::SecretsConfig;
use crate::error::{Result, SecretError};

pub use file::SecretsFile;

/// Credential field suffixes looked up as `<CLIENT>_MIG_<FIELD>`.
pub mod fields {
    pub const ACCOUNT: &str = "ACCOUNT";
    pub const ROLE: &str = "ROLE";
    pub const PRIVATE_KEY: &str = "PRIVATE";
    pub const PASSPHRASE: &str = "PASSPHRASE";
}

/// Decoded secret payload.
///
/// Values are zeroized when the bundle is dropped and never written to disk.
pub struct SecretBundle {
    values: BTreeMap<String, Zeroizing<String>>,
}

impl std::fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBundle")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SecretBundle {
    /// Parse a JSON object payload.
    ///
    /// String values are taken as-is; other scalars use their JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::InvalidJson` if the payload is not a JSON object.
    pub fn from_json(name: &str, payload: &str) -> Result<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(payload)
            .map_err(|source| SecretError::InvalidJson {
                name: name.to_string(),
                source,
            })?;

        let values = object
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, Zeroizing::new(value))
            })
            .collect();

        Ok(Self { values })
    }

    /// Look up a credential.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::MissingField` if the key is absent.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.values
            .get(key)
            .map(|v| v.as_str())
            .ok_or_else(|| SecretError::MissingField(key.to_string()).into())
    }
}

/// Secret store backend.
pub trait SecretSource {
    /// Fetch and decode the named secret.
    ///
    /// # Errors
    ///
    /// Returns `SecretError` if the store is unreachable, the secret does
    /// not exist, or its payload is not a JSON object.
    fn fetch(&self, name: &str) -> Result<SecretBundle>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Build the secret source selected by configuration.
///
/// A configured `file` wins; otherwise AWS Secrets Manager is used.
///
/// # Errors
///
/// Returns `SecretError::AwsUnavailable` when no file is configured and the
/// `aws` feature is not compiled in.
pub fn source_from_config(config: &SecretsConfig) -> Result<Box<dyn SecretSource>> {
    if let Some(path) = &config.file {
        debug!(path = %path.display(), "using secrets file");
        return Ok(Box::new(SecretsFile::new(path.clone())));
    }

    #[cfg(feature = "aws")]
    {
        debug!(region = %config.region, "using AWS Secrets Manager");
        Ok(Box::new(aws::AwsSecretsManager::new(config.region.clone())))
    }

    #[cfg(not(feature = "aws"))]
    {
        Err(SecretError::AwsUnavailable.into())
    }
}
