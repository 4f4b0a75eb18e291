//! Terraform command invocation

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::process::Command;

use terramaas_core::error::ApplyError;
use terramaas_core::{Result, TerramaasError};

pub const DEFAULT_TERRAFORM: &str = "terraform";

/// One command line, run inside `dir`
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl Invocation {
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandOutcome {
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: Invocation) -> Result<CommandOutcome>;
}

/// Runs commands as child processes sharing this process's terminal
#[derive(Debug, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: Invocation) -> Result<CommandOutcome> {
        let start_time = Instant::now();
        debug!("Executing '{}' in {}", invocation, invocation.dir.display());

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| {
                error!("'{}' failed to start: {}", invocation, source);
                TerramaasError::Apply(ApplyError::Spawn {
                    command: invocation.to_string(),
                    source,
                })
            })?;

        let outcome = CommandOutcome {
            exit_code: status.code(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        };
        debug!(
            "'{}' exited with {:?} after {}ms",
            invocation, outcome.exit_code, outcome.duration_ms
        );
        Ok(outcome)
    }
}

/// Terraform lifecycle commands
pub struct TerraformDriver<R: CommandRunner = ProcessRunner> {
    binary: String,
    runner: R,
}

impl TerraformDriver<ProcessRunner> {
    pub fn new(binary: impl Into<String>) -> Self {
        Self::with_runner(binary, ProcessRunner)
    }
}

impl<R: CommandRunner> TerraformDriver<R> {
    pub fn with_runner(binary: impl Into<String>, runner: R) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }

    pub async fn init(&self, dir: &Path) -> Result<()> {
        self.execute(dir, &["init"]).await
    }

    pub async fn plan(&self, dir: &Path) -> Result<()> {
        self.execute(dir, &["plan"]).await
    }

    pub async fn apply(&self, dir: &Path) -> Result<()> {
        self.execute(dir, &["apply", "-auto-approve"]).await
    }

    /// Without `auto_approve` terraform asks for confirmation itself
    pub async fn destroy(&self, dir: &Path, auto_approve: bool) -> Result<()> {
        if auto_approve {
            self.execute(dir, &["destroy", "-auto-approve"]).await
        } else {
            self.execute(dir, &["destroy"]).await
        }
    }

    async fn execute(&self, dir: &Path, args: &[&str]) -> Result<()> {
        let invocation = Invocation {
            program: self.binary.clone(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            dir: dir.to_path_buf(),
        };
        info!("Running {}", invocation);

        let command = invocation.to_string();
        let outcome = self.runner.run(invocation).await?;
        if !outcome.success() {
            warn!("{} failed with exit code {:?}", command, outcome.exit_code);
            return Err(TerramaasError::Apply(ApplyError::CommandFailed {
                command,
                exit_code: outcome.exit_code,
            }));
        }
        Ok(())
    }
}
