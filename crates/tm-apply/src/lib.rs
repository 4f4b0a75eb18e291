//! Terramaas Apply
//!
//! Writes generated scripts into a terraform working directory and drives
//! the terraform lifecycle for create, update and destroy.

pub mod terraform;
pub mod workspace;

#[cfg(test)]
mod tests;

pub use terraform::{
    CommandOutcome, CommandRunner, Invocation, ProcessRunner, TerraformDriver, DEFAULT_TERRAFORM,
};
pub use workspace::{ScriptWorkspace, DEFAULT_SCRIPT_NAME, STATE_FILE};

use log::info;

use terramaas_core::Result;

/// How a lifecycle command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Applied,
    Aborted,
    Destroyed,
}

/// Terraform lifecycle around one script workspace
pub struct Deployment<R: CommandRunner = ProcessRunner> {
    driver: TerraformDriver<R>,
}

impl<R: CommandRunner> Deployment<R> {
    pub fn new(driver: TerraformDriver<R>) -> Self {
        Self { driver }
    }

    /// Write a fresh script, then init, plan and apply after confirmation
    pub async fn create<F>(
        &self,
        workspace: &ScriptWorkspace,
        script: &str,
        confirm: F,
    ) -> Result<DeployOutcome>
    where
        F: FnOnce() -> Result<bool>,
    {
        workspace.ensure_creatable()?;
        workspace.write_script(script).await?;
        self.driver.init(workspace.dir()).await?;
        self.plan_and_apply(workspace, confirm).await
    }

    /// Rewrite the script of an applied workspace, then plan and apply
    pub async fn update<F>(
        &self,
        workspace: &ScriptWorkspace,
        script: &str,
        confirm: F,
    ) -> Result<DeployOutcome>
    where
        F: FnOnce() -> Result<bool>,
    {
        workspace.ensure_state()?;
        workspace.write_script(script).await?;
        self.plan_and_apply(workspace, confirm).await
    }

    pub async fn destroy(
        &self,
        workspace: &ScriptWorkspace,
        auto_approve: bool,
    ) -> Result<DeployOutcome> {
        workspace.ensure_state()?;
        self.driver.destroy(workspace.dir(), auto_approve).await?;
        info!("Destroyed resources managed in {}", workspace.dir().display());
        Ok(DeployOutcome::Destroyed)
    }

    async fn plan_and_apply<F>(&self, workspace: &ScriptWorkspace, confirm: F) -> Result<DeployOutcome>
    where
        F: FnOnce() -> Result<bool>,
    {
        self.driver.plan(workspace.dir()).await?;
        if !confirm()? {
            info!("Apply declined, leaving {} unapplied", workspace.dir().display());
            return Ok(DeployOutcome::Aborted);
        }
        self.driver.apply(workspace.dir()).await?;
        Ok(DeployOutcome::Applied)
    }
}
