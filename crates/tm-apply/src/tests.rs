//! Lifecycle tests against a mocked terraform

use std::fs;

use mockall::Sequence;
use tempfile::TempDir;

use terramaas_core::error::ApplyError;
use terramaas_core::{Result, TerramaasError};

use crate::terraform::MockCommandRunner;
use crate::{CommandOutcome, DeployOutcome, Deployment, ScriptWorkspace, TerraformDriver, STATE_FILE};

const SCRIPT: &str = "provider \"maas\" {\n  api_version = \"2.0\"\n}\n";

fn exited(code: i32) -> Result<CommandOutcome> {
    Ok(CommandOutcome {
        exit_code: Some(code),
        duration_ms: 1,
    })
}

/// Runner expecting exactly these subcommands, in order, all succeeding
fn expect_steps(steps: &[&'static str]) -> MockCommandRunner {
    let mut runner = MockCommandRunner::new();
    let mut seq = Sequence::new();
    for &step in steps {
        runner
            .expect_run()
            .withf(move |inv| inv.subcommand() == Some(step))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| exited(0));
    }
    runner
}

fn deployment(runner: MockCommandRunner) -> Deployment<MockCommandRunner> {
    Deployment::new(TerraformDriver::with_runner("terraform", runner))
}

#[tokio::test]
async fn test_create_runs_full_lifecycle() {
    let dir = TempDir::new().unwrap();
    let workspace = ScriptWorkspace::for_script(dir.path().join("terraform_script.tf"));

    let outcome = deployment(expect_steps(&["init", "plan", "apply"]))
        .create(&workspace, SCRIPT, || Ok(true))
        .await
        .unwrap();

    assert_eq!(outcome, DeployOutcome::Applied);
    assert_eq!(fs::read_to_string(workspace.script_path()).unwrap(), SCRIPT);
}

#[tokio::test]
async fn test_create_declined_skips_apply() {
    let dir = TempDir::new().unwrap();
    let workspace = ScriptWorkspace::for_script(dir.path().join("main.tf"));

    let outcome = deployment(expect_steps(&["init", "plan"]))
        .create(&workspace, SCRIPT, || Ok(false))
        .await
        .unwrap();

    assert_eq!(outcome, DeployOutcome::Aborted);
    assert!(workspace.script_path().exists());
}

#[tokio::test]
async fn test_repeated_create_conflicts() {
    let dir = TempDir::new().unwrap();
    let workspace = ScriptWorkspace::for_script(dir.path().join("main.tf"));

    deployment(expect_steps(&["init", "plan", "apply"]))
        .create(&workspace, SCRIPT, || Ok(true))
        .await
        .unwrap();

    for _ in 0..2 {
        let err = deployment(MockCommandRunner::new())
            .create(&workspace, "changed", || Ok(true))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TerramaasError::Apply(ApplyError::OutputConflict { .. })
        ));
    }
    assert_eq!(fs::read_to_string(workspace.script_path()).unwrap(), SCRIPT);
}

#[tokio::test]
async fn test_update_requires_state() {
    let dir = TempDir::new().unwrap();
    let workspace = ScriptWorkspace::in_dir(dir.path(), "main.tf");

    let err = deployment(MockCommandRunner::new())
        .update(&workspace, SCRIPT, || Ok(true))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TerramaasError::Apply(ApplyError::NoStateFound { .. })
    ));
    assert!(!workspace.script_path().exists());
}

#[tokio::test]
async fn test_update_rewrites_script_and_applies() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(STATE_FILE), "{}").unwrap();
    fs::write(dir.path().join("main.tf"), "old").unwrap();
    let workspace = ScriptWorkspace::in_dir(dir.path(), "main.tf");

    let outcome = deployment(expect_steps(&["plan", "apply"]))
        .update(&workspace, SCRIPT, || Ok(true))
        .await
        .unwrap();

    assert_eq!(outcome, DeployOutcome::Applied);
    assert_eq!(fs::read_to_string(workspace.script_path()).unwrap(), SCRIPT);
}

#[tokio::test]
async fn test_failed_plan_stops_lifecycle() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(STATE_FILE), "{}").unwrap();
    let workspace = ScriptWorkspace::in_dir(dir.path(), "main.tf");

    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .withf(|inv| inv.subcommand() == Some("plan"))
        .times(1)
        .returning(|_| exited(1));

    let err = deployment(runner)
        .update(&workspace, SCRIPT, || panic!("confirmation must not be asked"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TerramaasError::Apply(ApplyError::CommandFailed {
            exit_code: Some(1),
            ..
        })
    ));
}

#[tokio::test]
async fn test_destroy() {
    let dir = TempDir::new().unwrap();
    let workspace = ScriptWorkspace::in_dir(dir.path(), "main.tf");

    let err = deployment(MockCommandRunner::new())
        .destroy(&workspace, true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TerramaasError::Apply(ApplyError::NoStateFound { .. })
    ));

    fs::write(workspace.state_path(), "{}").unwrap();
    let outcome = deployment(expect_steps(&["destroy"]))
        .destroy(&workspace, true)
        .await
        .unwrap();
    assert_eq!(outcome, DeployOutcome::Destroyed);
}
