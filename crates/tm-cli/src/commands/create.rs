//! Create command

use anyhow::{Context, Result};
use log::info;

use terramaas_apply::{Deployment, ScriptWorkspace, TerraformDriver};

use super::{confirmation, load_credentials, render_script, report_outcome, ScriptModel};
use crate::cli::CreateArgs;

/// Create command implementation
pub struct CreateCommand {
    deployment: Deployment,
}

impl CreateCommand {
    pub fn new(terraform: &str) -> Self {
        Self {
            deployment: Deployment::new(TerraformDriver::new(terraform)),
        }
    }

    /// Generate a fresh script, then init, plan and apply it
    pub async fn execute(&self, args: &CreateArgs) -> Result<()> {
        let workspace = ScriptWorkspace::for_script(&args.output);
        workspace
            .ensure_creatable()
            .with_context(|| "Refusing to overwrite an existing deployment")?;

        let credentials = load_credentials(&args.credentials)?;
        let model = ScriptModel::load(&args.sheets)?;
        let generated = render_script(&credentials, &model)?;
        info!(
            "Generated {} resources for {} ({} warnings)",
            generated.script.resource_count(),
            workspace.script_path().display(),
            generated.report.warnings.len()
        );

        let outcome = self
            .deployment
            .create(&workspace, &generated.text, || confirmation(args.yes))
            .await
            .with_context(|| format!("Failed to create {}", workspace.script_path().display()))?;

        report_outcome(outcome);
        Ok(())
    }
}
