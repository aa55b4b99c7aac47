//! Error types for snowdeploy.
//!
//! One enum per concern, folded into [`Error`] so every layer can use `?`.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned by every fallible operation.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors loading or validating `.snowdeploy.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Errors reading discovery inputs (changed-file lists, manifests, marker files).
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors parsing a `<client>_<env>` target token.
#[derive(Error, Debug)]
pub enum TargetError {
    #[error("invalid target '{0}': expected <client>_<env>")]
    InvalidFormat(String),

    #[error("unknown environment '{env}' in target '{token}' (expected dev, qa or prod)")]
    UnknownEnv { token: String, env: String },
}

/// Errors resolving the secret bundle.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("secret store request failed: {0}")]
    Fetch(String),

    #[error("secret '{0}' has no string payload")]
    EmptyPayload(String),

    #[error("secret '{name}' is not a JSON object of strings: {source}")]
    InvalidJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("credential '{0}' missing from secret bundle")]
    MissingField(String),

    #[error("AWS support not compiled. Rebuild with: cargo install snowdeploy --features aws")]
    AwsUnavailable,
}

/// Errors decrypting and writing the private key.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("malformed private key PEM: {0}")]
    InvalidPem(String),

    #[error("unsupported PEM label '{0}' (expected ENCRYPTED PRIVATE KEY or PRIVATE KEY)")]
    UnsupportedLabel(String),

    #[error("unsupported private key encryption algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("private key is encrypted but no passphrase was provided")]
    MissingPassphrase,

    #[error("failed to decrypt private key: {0}")]
    DecryptionFailed(String),

    #[error("failed to write key file: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Errors launching the external deploy CLI.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("'{0}' not found on PATH")]
    CliNotFound(String),

    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
