//! Command-line interface.

pub mod deploy;
pub mod output;

use clap::Parser;
use std::path::PathBuf;

use crate::core::config::Overrides;
use crate::core::discovery::Strategy;
use crate::core::environment::ConnectionStyle;

/// snowdeploy - Deploy only the Snowpark projects that changed in a monorepo.
#[derive(Parser, Debug)]
#[command(
    name = "snowdeploy",
    about = "Deploy only the Snowpark projects that changed in a monorepo",
    version,
    after_help = "Examples:\n  snowdeploy . changed_files.txt\n  snowdeploy . changed_files.txt acme_prod\n  snowdeploy --strategy manifest . deploy.yml acme_qa"
)]
pub struct Cli {
    /// Repository root to scan
    pub root: PathBuf,

    /// Changed-files list (walk, prefix) or manifest (manifest strategy)
    pub input: PathBuf,

    /// Target environment as <client>_<env>, e.g. acme_prod
    pub target: Option<String>,

    /// Project discovery strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Marker file identifying a project
    #[arg(long, value_name = "FILE")]
    pub marker: Option<String>,

    /// First path segment grouping projects (prefix strategy)
    #[arg(long, value_name = "DIR")]
    pub prefix: Option<String>,

    /// Read credentials from a local JSON file instead of the secret store
    #[arg(long, value_name = "FILE", env = "SNOWDEPLOY_SECRETS_FILE")]
    pub secrets_file: Option<PathBuf>,

    /// Deploy CLI to invoke
    #[arg(long, value_name = "BIN", env = "SNOWDEPLOY_SNOW_BIN")]
    pub snow_bin: Option<String>,

    /// Pass the connection as environment variables or command-line flags
    #[arg(long, value_enum)]
    pub style: Option<ConnectionStyle>,

    /// Stop at the first project that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the commands that would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Configuration overrides given on the command line.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            strategy: self.strategy,
            marker_file: self.marker.clone(),
            prefix: self.prefix.clone(),
            secrets_file: self.secrets_file.clone(),
            snow_bin: self.snow_bin.clone(),
            style: self.style,
            fail_fast: self.fail_fast,
        }
    }
}

/// Run the CLI.
///
/// Returns `Ok(false)` when the run completed but some project failed.
pub fn execute(cli: Cli) -> crate::error::Result<bool> {
    deploy::execute(&cli)
}
