//! Connection settings for the deploy CLI.
//!
//! A [`Connection`] is built either from a target token plus the secret
//! bundle ([`configure`]) or from the `SNOWFLAKE_*` variables already set
//! in the environment ([`Connection::from_env`]). It is handed to the
//! dispatcher explicitly and applied per child process; the process's own
//! environment is never modified.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

use crate::core::config::ConnectionConfig;
use crate::core::constants::{self, env};
use crate::core::keys::{self, KeyFile};
use crate::core::secrets::{fields, SecretSource};
use crate::core::target::Target;
use crate::error::Result;

/// How connection parameters reach the deploy CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStyle {
    /// `SNOWFLAKE_*` environment variables on the child process
    Env,
    /// `--temporary-connection --account ...` command-line flags
    Flags,
}

/// Snowflake connection parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connection {
    pub account: Option<String>,
    pub user: Option<String>,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub authenticator: Option<String>,
    pub private_key_path: Option<PathBuf>,
}

impl Connection {
    /// Read the connection from `SNOWFLAKE_*` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the connection through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        Self {
            account: get(env::ACCOUNT),
            user: get(env::USER),
            role: get(env::ROLE),
            warehouse: get(env::WAREHOUSE),
            database: get(env::DATABASE),
            authenticator: get(env::AUTHENTICATOR),
            private_key_path: get(env::PRIVATE_KEY_PATH).map(PathBuf::from),
        }
    }

    /// Variables to set on the child process, in a fixed order.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = Vec::new();
        let mut push = |name: &'static str, value: &Option<String>| {
            if let Some(value) = value {
                vars.push((name, value.clone()));
            }
        };
        push(env::ACCOUNT, &self.account);
        push(env::USER, &self.user);
        push(env::ROLE, &self.role);
        push(env::WAREHOUSE, &self.warehouse);
        push(env::DATABASE, &self.database);
        push(env::AUTHENTICATOR, &self.authenticator);
        if let Some(path) = &self.private_key_path {
            vars.push((env::PRIVATE_KEY_PATH, path.display().to_string()));
        }
        vars
    }

    /// `snow` flags for a temporary connection.
    pub fn flags(&self) -> Vec<String> {
        let mut flags = vec!["--temporary-connection".to_string()];
        let mut push = |flag: &str, value: Option<String>| {
            if let Some(value) = value {
                flags.push(flag.to_string());
                flags.push(value);
            }
        };
        push("--account", self.account.clone());
        push("--user", self.user.clone());
        push("--role", self.role.clone());
        push("--warehouse", self.warehouse.clone());
        push("--database", self.database.clone());
        push("--authenticator", self.authenticator.clone());
        push(
            "--private-key-file",
            self.private_key_path
                .as_ref()
                .map(|p| p.display().to_string()),
        );
        flags
    }
}

/// A configured target: connection plus the key file it points at.
///
/// The key file is deleted when this value is dropped.
#[derive(Debug)]
pub struct Environment {
    target: Target,
    connection: Connection,
    _key_file: KeyFile,
}

impl Environment {
    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

/// Resolve a target token into a ready-to-use connection.
///
/// The token is validated before the secret store is contacted.
///
/// # Errors
///
/// Returns `TargetError` for a malformed token, `SecretError` if the bundle
/// cannot be fetched or lacks a credential, and `KeyError` if the private
/// key cannot be decrypted.
pub fn configure(
    token: &str,
    source: &dyn SecretSource,
    secret_name: &str,
    config: &ConnectionConfig,
) -> Result<Environment> {
    let target: Target = token.parse()?;
    debug!(target = %target, source = source.name(), "configuring environment");

    let bundle = source.fetch(secret_name)?;
    let account = bundle.get(&target.secret_key(fields::ACCOUNT))?;
    let role = bundle.get(&target.secret_key(fields::ROLE))?;
    let private_key = bundle.get(&target.secret_key(fields::PRIVATE_KEY))?;
    let passphrase = bundle.get(&target.secret_key(fields::PASSPHRASE))?;

    let key_file = keys::materialize(private_key, Some(passphrase))?;

    let connection = Connection {
        account: Some(account.to_string()),
        user: Some(config.user.clone()),
        role: Some(role.to_string()),
        warehouse: Some(config.warehouse.clone()),
        database: Some(target.database().to_string()),
        authenticator: Some(constants::JWT_AUTHENTICATOR.to_string()),
        private_key_path: Some(key_file.path().to_path_buf()),
    };

    debug!(
        account = %account,
        role = %role,
        database = target.database(),
        "environment configured"
    );

    Ok(Environment {
        target,
        connection,
        _key_file: key_file,
    })
}

/// Connection used for a dry run: everything except the secret-derived
/// values, which are left unset.
///
/// # Errors
///
/// Returns `TargetError` for a malformed token.
pub fn preview(token: &str, config: &ConnectionConfig) -> Result<Connection> {
    let target: Target = token.parse()?;
    Ok(Connection {
        user: Some(config.user.clone()),
        warehouse: Some(config.warehouse.clone()),
        database: Some(target.database().to_string()),
        authenticator: Some(constants::JWT_AUTHENTICATOR.to_string()),
        ..Default::default()
    })
}
