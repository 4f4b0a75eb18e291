//! Script workspace: the output file and the directory terraform runs in

use std::path::{Path, PathBuf};

use log::{debug, info};

use terramaas_core::error::ApplyError;
use terramaas_core::{Result, TerramaasError};

pub const DEFAULT_SCRIPT_NAME: &str = "terraform_script.tf";
pub const STATE_FILE: &str = "terraform.tfstate";

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptWorkspace {
    dir: PathBuf,
    script_path: PathBuf,
}

impl ScriptWorkspace {
    /// Workspace around an output path; terraform runs in its parent directory
    pub fn for_script<P: AsRef<Path>>(script_path: P) -> Self {
        let script_path = script_path.as_ref().to_path_buf();
        let dir = match script_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self { dir, script_path }
    }

    /// Workspace for an existing terraform directory
    pub fn in_dir<P: AsRef<Path>>(dir: P, script_name: &str) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            script_path: dir.join(script_name),
            dir,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn has_state(&self) -> bool {
        self.state_path().is_file()
    }

    /// A fresh create must not overwrite a script or an existing state
    pub fn ensure_creatable(&self) -> Result<()> {
        for path in [self.script_path.clone(), self.state_path()] {
            if path.exists() {
                return Err(TerramaasError::Apply(ApplyError::OutputConflict {
                    path: path.display().to_string(),
                }));
            }
        }
        Ok(())
    }

    /// Update and destroy need state from an earlier apply
    pub fn ensure_state(&self) -> Result<()> {
        if !self.has_state() {
            return Err(TerramaasError::Apply(ApplyError::NoStateFound {
                dir: self.dir.display().to_string(),
            }));
        }
        debug!("Found terraform state in {}", self.dir.display());
        Ok(())
    }

    /// Write the script, creating the directory when needed
    pub async fn write_script(&self, contents: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&self.script_path, contents).await?;
        info!(
            "Wrote {} bytes to {}",
            contents.len(),
            self.script_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bare_file_name_runs_in_current_dir() {
        let workspace = ScriptWorkspace::for_script("main.tf");
        assert_eq!(workspace.dir(), Path::new("."));
        assert_eq!(workspace.state_path(), Path::new("./terraform.tfstate"));
    }

    #[test]
    fn test_in_dir_joins_script_name() {
        let workspace = ScriptWorkspace::in_dir("/srv/maas", DEFAULT_SCRIPT_NAME);
        assert_eq!(
            workspace.script_path(),
            Path::new("/srv/maas/terraform_script.tf")
        );
    }

    #[tokio::test]
    async fn test_second_create_conflicts() {
        let dir = TempDir::new().unwrap();
        let workspace = ScriptWorkspace::for_script(dir.path().join("out/main.tf"));

        workspace.ensure_creatable().unwrap();
        workspace.write_script("provider \"maas\" {}\n").await.unwrap();

        for _ in 0..2 {
            let err = workspace.ensure_creatable().unwrap_err();
            assert!(matches!(
                err,
                TerramaasError::Apply(ApplyError::OutputConflict { .. })
            ));
        }
    }

    #[test]
    fn test_state_alone_conflicts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(STATE_FILE), "{}").unwrap();
        let workspace = ScriptWorkspace::in_dir(dir.path(), DEFAULT_SCRIPT_NAME);

        let err = workspace.ensure_creatable().unwrap_err();
        assert!(err.to_string().contains(STATE_FILE));
        workspace.ensure_state().unwrap();
    }

    #[test]
    fn test_missing_state() {
        let dir = TempDir::new().unwrap();
        let workspace = ScriptWorkspace::in_dir(dir.path(), DEFAULT_SCRIPT_NAME);
        let err = workspace.ensure_state().unwrap_err();
        assert!(matches!(
            err,
            TerramaasError::Apply(ApplyError::NoStateFound { .. })
        ));
    }
}
