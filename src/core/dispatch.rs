//! Deployment dispatch.
//!
//! Runs `snow snowpark build` and `snow snowpark deploy --replace` for each
//! discovered project, in order, and records what happened.
//!
//! Each command gets the project directory as its working directory and
//! the connection as flags or environment variables; nothing global is
//! changed, so one dispatcher never affects another.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::core::discovery::Discovered;
use crate::core::environment::{Connection, ConnectionStyle};
use crate::core::project::ProjectConfig;
use crate::error::{DispatchError, Result};

/// What to do with the remaining projects after one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Deploy every project regardless of earlier failures
    #[default]
    Continue,
    /// Stop at the first failed project
    FailFast,
}

/// A `snow` command run for each project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Build,
    Deploy,
}

impl Step {
    /// Arguments before the connection parameters.
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            Self::Build => &["snowpark", "build"],
            Self::Deploy => &["snowpark", "deploy", "--replace"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Deploy => "deploy",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub step: Step,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub envs: Vec<(&'static str, String)>,
}

impl fmt::Display for Invocation {
    /// Shell-like rendering; environment values are not shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, _) in &self.envs {
            write!(f, "{}=… ", name)?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes invocations.
pub trait Runner {
    /// Run an invocation to completion.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Spawn` if the process cannot be started. A
    /// non-zero exit is not an error; it is reported in the outcome.
    fn run(&self, invocation: &Invocation) -> Result<StepOutcome>;
}

/// Runs invocations as child processes, capturing their output.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<StepOutcome> {
        debug!(
            step = invocation.step.name(),
            cwd = %invocation.cwd.display(),
            "running {}",
            invocation
        );

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.envs.iter().map(|(k, v)| (*k, v.as_str())))
            .output()
            .map_err(|source| DispatchError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(StepOutcome {
            step: invocation.step,
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Why a project was not deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No marker file in the project directory
    NoMarker,
    /// Marker file without a `snowpark` section
    NotSnowpark,
}

/// Final state of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    Deployed { name: String },
    Skipped(SkipReason),
    Failed { name: String, outcome: StepOutcome },
}

/// Per-project record in a [`DeployReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutcome {
    pub path: String,
    pub status: ProjectStatus,
    pub steps: Vec<StepOutcome>,
}

/// Progress notifications emitted while dispatching.
#[derive(Debug)]
pub enum Event<'a> {
    /// A project is about to be examined
    Processing { path: &'a str },
    /// A Snowpark project is about to be built and deployed
    Deploying { path: &'a str, name: &'a str },
    /// A command finished
    StepFinished { path: &'a str, outcome: &'a StepOutcome },
    /// A project is done
    Finished(&'a ProjectOutcome),
}

/// Outcome of a whole run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub outcomes: Vec<ProjectOutcome>,
    /// Projects left untouched because of the fail-fast policy
    pub not_attempted: Vec<String>,
}

impl DeployReport {
    pub fn deployed(&self) -> usize {
        self.count(|s| matches!(s, ProjectStatus::Deployed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ProjectStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ProjectStatus::Failed { .. }))
    }

    /// True when no project failed.
    pub fn success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&ProjectStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Builds and deploys discovered projects.
pub struct Dispatcher<'a, R: Runner> {
    pub root: &'a Path,
    pub marker_file: &'a str,
    pub snow_bin: &'a str,
    pub connection: &'a Connection,
    pub style: ConnectionStyle,
    pub policy: FailurePolicy,
    pub runner: R,
}

impl<'a, R: Runner> Dispatcher<'a, R> {
    /// Dispatch every project in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a marker file cannot be parsed or a command
    /// cannot be launched. Command failures are recorded in the report.
    pub fn run(
        &self,
        discovered: &Discovered,
        mut on_event: impl FnMut(Event<'_>),
    ) -> Result<DeployReport> {
        let mut report = DeployReport::default();
        let mut paths = discovered.paths();

        for path in paths.by_ref() {
            let outcome = self.dispatch_one(path, &mut on_event)?;
            on_event(Event::Finished(&outcome));

            let failed = matches!(outcome.status, ProjectStatus::Failed { .. });
            report.outcomes.push(outcome);

            if failed && self.policy == FailurePolicy::FailFast {
                warn!(project = path, "stopping after failed project");
                break;
            }
        }

        report.not_attempted = paths.map(str::to_string).collect();
        Ok(report)
    }

    /// Build and deploy one project.
    pub fn dispatch_one(
        &self,
        path: &str,
        on_event: &mut impl FnMut(Event<'_>),
    ) -> Result<ProjectOutcome> {
        on_event(Event::Processing { path });
        let dir = self.root.join(path);

        let config = match ProjectConfig::load(&dir, self.marker_file)? {
            Some(config) => config,
            None => {
                warn!(project = path, marker = self.marker_file, "no marker file, skipping");
                return Ok(skipped(path, SkipReason::NoMarker));
            }
        };
        if !config.is_snowpark() {
            debug!(project = path, "not a Snowpark project, skipping");
            return Ok(skipped(path, SkipReason::NotSnowpark));
        }

        let name = config.project_name().to_string();
        on_event(Event::Deploying { path, name: &name });

        let mut steps = Vec::new();
        for step in [Step::Build, Step::Deploy] {
            let outcome = self.runner.run(&self.invocation(step, &dir))?;
            on_event(Event::StepFinished {
                path,
                outcome: &outcome,
            });

            if !outcome.success() {
                warn!(project = path, step = step.name(), code = ?outcome.code, "step failed");
                let failed = outcome.clone();
                steps.push(outcome);
                return Ok(ProjectOutcome {
                    path: path.to_string(),
                    status: ProjectStatus::Failed {
                        name,
                        outcome: failed,
                    },
                    steps,
                });
            }
            steps.push(outcome);
        }

        Ok(ProjectOutcome {
            path: path.to_string(),
            status: ProjectStatus::Deployed { name },
            steps,
        })
    }

    /// The command for `step` in project directory `dir`.
    pub fn invocation(&self, step: Step, dir: &Path) -> Invocation {
        let mut args: Vec<String> = step.args().iter().map(|a| a.to_string()).collect();
        let envs = match self.style {
            ConnectionStyle::Flags => {
                args.extend(self.connection.flags());
                Vec::new()
            }
            ConnectionStyle::Env => self.connection.env_vars(),
        };

        Invocation {
            step,
            program: self.snow_bin.to_string(),
            args,
            cwd: dir.to_path_buf(),
            envs,
        }
    }
}

fn skipped(path: &str, reason: SkipReason) -> ProjectOutcome {
    ProjectOutcome {
        path: path.to_string(),
        status: ProjectStatus::Skipped(reason),
        steps: Vec::new(),
    }
}
