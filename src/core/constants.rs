//! Constants used throughout snowdeploy.
//!
//! Centralizes magic strings and default configuration values.

/// Optional configuration file at the scan root (.snowdeploy.toml).
pub const CONFIG_FILE: &str = ".snowdeploy.toml";

/// Marker file identifying a Snowpark project directory.
pub const MARKER_FILE: &str = "snowflake.yml";

/// Top-level section a marker file must contain to be deployable.
pub const PROJECT_SECTION: &str = "snowpark";

/// Display name used when the marker file has no `project_name`.
pub const UNNAMED_PROJECT: &str = "Unnamed";

/// Path prefix grouping projects in the prefix strategy (`steps/<name>/...`).
pub const PROJECT_PREFIX: &str = "steps";

/// Directory names never considered part of a project.
pub const IGNORED_DIRS: &[&str] = &[".git", "__pycache__", ".ipynb_checkpoints"];

/// Secret holding per-client migration credentials.
pub const SECRET_NAME: &str = "snowflake/migration";

/// Region of the secret store.
pub const SECRET_REGION: &str = "us-east-1";

/// Default Snowflake user for deployments.
pub const DEFAULT_USER: &str = "SNOWPARK_DEPLOY";

/// Default Snowflake warehouse for deployments.
pub const DEFAULT_WAREHOUSE: &str = "COMPUTE_WH";

/// Authenticator used with key-pair credentials.
pub const JWT_AUTHENTICATOR: &str = "SNOWFLAKE_JWT";

/// External deploy CLI binary.
pub const SNOW_BIN: &str = "snow";

/// Environment variable controlling the log filter.
pub const LOG_ENV: &str = "SNOWDEPLOY_LOG";

/// Environment variables consumed by the `snow` CLI.
pub mod env {
    pub const ACCOUNT: &str = "SNOWFLAKE_ACCOUNT";
    pub const USER: &str = "SNOWFLAKE_USER";
    pub const ROLE: &str = "SNOWFLAKE_ROLE";
    pub const WAREHOUSE: &str = "SNOWFLAKE_WAREHOUSE";
    pub const DATABASE: &str = "SNOWFLAKE_DATABASE";
    pub const AUTHENTICATOR: &str = "SNOWFLAKE_AUTHENTICATOR";
    pub const PRIVATE_KEY_PATH: &str = "SNOWFLAKE_PRIVATE_KEY_PATH";
}
