//! Destroy command

use anyhow::{Context, Result};

use terramaas_apply::{Deployment, ScriptWorkspace, TerraformDriver, DEFAULT_SCRIPT_NAME};

use super::report_outcome;
use crate::cli::DestroyArgs;

/// Destroy command implementation
pub struct DestroyCommand {
    deployment: Deployment,
}

impl DestroyCommand {
    pub fn new(terraform: &str) -> Self {
        Self {
            deployment: Deployment::new(TerraformDriver::new(terraform)),
        }
    }

    pub async fn execute(&self, args: &DestroyArgs) -> Result<()> {
        let workspace = ScriptWorkspace::in_dir(&args.directory, DEFAULT_SCRIPT_NAME);
        let outcome = self
            .deployment
            .destroy(&workspace, args.yes)
            .await
            .with_context(|| format!("Failed to destroy {}", workspace.dir().display()))?;

        report_outcome(outcome);
        Ok(())
    }
}
