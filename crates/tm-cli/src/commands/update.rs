//! Update command

use anyhow::{Context, Result};

use terramaas_apply::{Deployment, ScriptWorkspace, TerraformDriver};

use super::{confirmation, load_credentials, render_script, report_outcome, ScriptModel};
use crate::cli::UpdateArgs;

/// Update command implementation
pub struct UpdateCommand {
    deployment: Deployment,
}

impl UpdateCommand {
    pub fn new(terraform: &str) -> Self {
        Self {
            deployment: Deployment::new(TerraformDriver::new(terraform)),
        }
    }

    /// Regenerate the script of an applied directory, then plan and apply
    pub async fn execute(&self, args: &UpdateArgs) -> Result<()> {
        let workspace = ScriptWorkspace::in_dir(&args.directory, &args.output);
        workspace
            .ensure_state()
            .with_context(|| "Nothing to update, run create first")?;

        let credentials = load_credentials(&args.credentials)?;
        let model = ScriptModel::load(&args.sheets)?;
        let generated = render_script(&credentials, &model)?;

        let outcome = self
            .deployment
            .update(&workspace, &generated.text, || confirmation(args.yes))
            .await
            .with_context(|| format!("Failed to update {}", workspace.dir().display()))?;

        report_outcome(outcome);
        Ok(())
    }
}
