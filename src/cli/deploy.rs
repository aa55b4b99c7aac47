//! Deployment run.
//!
//! Discovers changed projects, resolves the connection for the optional
//! target, then builds and deploys each project with the `snow` CLI.

use std::path::Path;
use tracing::debug;

use crate::cli::{output, Cli};
use crate::core::config::Config;
use crate::core::discovery::{Discovered, Discovery, Strategy};
use crate::core::dispatch::{
    DeployReport, Dispatcher, Event, Invocation, ProcessRunner, ProjectStatus, Runner,
    SkipReason, StepOutcome,
};
use crate::core::environment::{self, Connection, ConnectionStyle, Environment};
use crate::core::secrets;
use crate::core::target::Target;
use crate::error::{DiscoveryError, DispatchError, Result};

/// Execute a deployment run.
///
/// Returns `Ok(false)` if any project failed to build or deploy.
pub fn execute(cli: &Cli) -> Result<bool> {
    let root = cli.root.as_path();
    if !root.is_dir() {
        return Err(DiscoveryError::RootNotFound(root.to_path_buf()).into());
    }

    let mut config = Config::load(root)?;
    config.apply_overrides(cli.overrides())?;

    // Reject a bad target before reading inputs or contacting the secret store
    let target = cli.target.as_deref().map(str::parse::<Target>).transpose()?;

    output::info(&format!(
        "Deploying only updated Snowpark apps in {}",
        output::path(&root.display().to_string())
    ));

    let discovery = Discovery::from_config(&config.discovery);
    let discovered = discovery.discover(root, &cli.input)?;

    if discovered.is_empty() {
        match discovery.strategy() {
            Strategy::Manifest => output::info("No projects listed in manifest. Skipping deployment."),
            Strategy::Walk | Strategy::Prefix => {
                output::info("No updated Snowpark projects found. Skipping deployment.")
            }
        }
        return Ok(true);
    }

    print_discovered(&discovered);

    let environment = match (&cli.target, cli.dry_run) {
        (Some(token), false) => Some(configure_target(token, &config)?),
        _ => None,
    };
    let connection = match (&environment, &cli.target) {
        (Some(environment), _) => environment.connection().clone(),
        (None, Some(token)) => environment::preview(token, &config.connection)?,
        (None, None) => Connection::from_env(),
    };
    let style = config.connection.style.unwrap_or(match target {
        Some(_) => ConnectionStyle::Env,
        None => ConnectionStyle::Flags,
    });
    debug!(style = ?style, dry_run = cli.dry_run, "connection ready");

    let report = if cli.dry_run {
        dispatch(&config, root, &connection, style, PreviewRunner, &discovered, true)?
    } else {
        which::which(&config.deploy.snow_bin)
            .map_err(|_| DispatchError::CliNotFound(config.deploy.snow_bin.clone()))?;
        dispatch(&config, root, &connection, style, ProcessRunner, &discovered, false)?
    };

    print_summary(&report, cli.dry_run);

    // The key file is removed here, after every command has finished
    drop(environment);

    Ok(report.success())
}

/// Resolve credentials for `token` and print what was selected.
fn configure_target(token: &str, config: &Config) -> Result<Environment> {
    let source = secrets::source_from_config(&config.secrets)?;
    let environment = environment::configure(
        token,
        source.as_ref(),
        &config.secrets.name,
        &config.connection,
    )?;

    let connection = environment.connection();
    output::section(&format!("Target {}", environment.target()));
    output::kv("account: ", connection.account.as_deref().unwrap_or("-"));
    output::kv("role:    ", connection.role.as_deref().unwrap_or("-"));
    output::kv("database:", connection.database.as_deref().unwrap_or("-"));

    Ok(environment)
}

fn dispatch<R: Runner>(
    config: &Config,
    root: &Path,
    connection: &Connection,
    style: ConnectionStyle,
    runner: R,
    discovered: &Discovered,
    dry_run: bool,
) -> Result<DeployReport> {
    let dispatcher = Dispatcher {
        root,
        marker_file: &config.discovery.marker_file,
        snow_bin: &config.deploy.snow_bin,
        connection,
        style,
        policy: config.deploy.on_failure,
        runner,
    };

    dispatcher.run(discovered, |event| {
        print_event(event, &config.discovery.marker_file, dry_run)
    })
}

fn print_discovered(discovered: &Discovered) {
    output::section("Changed projects");
    for (path, files) in discovered.iter() {
        if files.is_empty() {
            output::list_item(&output::path(path));
            continue;
        }
        output::list_item(&format!("{} ({} changed)", output::path(path), files.len()));
        for file in files {
            output::captured(file);
        }
    }
}

fn print_event(event: Event<'_>, marker_file: &str, dry_run: bool) {
    match event {
        Event::Processing { path } => {
            output::section(&format!("Processing Snowflake project in {}", path));
        }
        Event::Deploying { name, .. } => {
            output::info(&format!("Deploying Snowpark project: {}", name));
        }
        Event::StepFinished { outcome, .. } => {
            if dry_run {
                return;
            }
            if outcome.success() {
                output::success(&format!("{} ok", outcome.step));
                output::captured(&outcome.stdout);
            } else {
                let code = outcome
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                output::error(&format!("{} failed (exit {})", outcome.step, code));
                output::captured(&outcome.stdout);
                output::captured(&outcome.stderr);
            }
        }
        Event::Finished(project) => match &project.status {
            ProjectStatus::Skipped(SkipReason::NoMarker) => {
                output::warn(&format!(
                    "Skipping {}, no {} found.",
                    project.path, marker_file
                ));
            }
            ProjectStatus::Skipped(SkipReason::NotSnowpark) => {
                output::info(&format!("Skipping non-Snowpark project: {}", project.path));
            }
            ProjectStatus::Deployed { name } if !dry_run => {
                output::success(&format!("deployed {}", name));
            }
            ProjectStatus::Deployed { .. } => {}
            ProjectStatus::Failed { name, outcome } => {
                output::error(&format!("{} ({}) failed at {}", project.path, name, outcome.step));
            }
        },
    }
}

fn print_summary(report: &DeployReport, dry_run: bool) {
    output::section("Summary");
    let done_label = if dry_run { "planned: " } else { "deployed:" };
    output::kv(done_label, report.deployed());
    output::kv("skipped: ", report.skipped());
    output::kv("failed:  ", report.failed());

    if !report.not_attempted.is_empty() {
        output::warn("stopped after first failure, not attempted:");
        for path in &report.not_attempted {
            output::list_item(path);
        }
    }

    if !report.success() {
        output::error(&format!("{} project(s) failed", report.failed()));
    } else if dry_run {
        output::hint("dry run, nothing was deployed");
    } else {
        output::success("Deployment complete.");
    }
}

/// Prints each command instead of running it.
struct PreviewRunner;

impl Runner for PreviewRunner {
    fn run(&self, invocation: &Invocation) -> Result<StepOutcome> {
        output::hint(&invocation.to_string());
        Ok(StepOutcome {
            step: invocation.step,
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}
