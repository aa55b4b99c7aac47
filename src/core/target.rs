//! Target environment tokens.
//!
//! A target is written `<client>_<env>`, e.g. `acme_prod`. The client
//! selects credentials in the secret bundle; the env selects the database.

use std::fmt;
use std::str::FromStr;

use crate::error::TargetError;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Dev,
    Qa,
    Prod,
}

impl Env {
    /// Database deployed into for this environment.
    pub fn database(&self) -> &'static str {
        match self {
            Self::Dev => "DEVELOPMENT",
            Self::Qa => "QA",
            Self::Prod => "PROD",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Qa => "qa",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed `<client>_<env>` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    client: String,
    env: Env,
}

impl Target {
    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn env(&self) -> Env {
        self.env
    }

    pub fn database(&self) -> &'static str {
        self.env.database()
    }

    /// Secret bundle key for a credential field, e.g. `ACME_MIG_ACCOUNT`.
    pub fn secret_key(&self, field: &str) -> String {
        format!("{}_MIG_{}", self.client.to_uppercase(), field)
    }
}

impl FromStr for Target {
    type Err = TargetError;

    /// Split on the first underscore; both halves must be non-empty and the
    /// env must be `dev`, `qa` or `prod`.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (client, env) = token
            .split_once('_')
            .filter(|(client, env)| !client.is_empty() && !env.is_empty())
            .ok_or_else(|| TargetError::InvalidFormat(token.to_string()))?;

        let env = match env {
            "dev" => Env::Dev,
            "qa" => Env::Qa,
            "prod" => Env::Prod,
            other => {
                return Err(TargetError::UnknownEnv {
                    token: token.to_string(),
                    env: other.to_string(),
                })
            }
        };

        Ok(Self {
            client: client.to_string(),
            env,
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.client, self.env)
    }
}
