//! CLI commands

pub mod create;
pub mod destroy;
pub mod generate;
pub mod update;

pub use create::CreateCommand;
pub use destroy::DestroyCommand;
pub use generate::GenerateCommand;
pub use update::UpdateCommand;

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use terramaas_apply::DeployOutcome;
use terramaas_config::{load_users, Credentials, Inventory, NetworkTopology};
use terramaas_core::{TerramaasError, User};
use terramaas_render::TerraformScript;
use terramaas_validate::{DocumentValidator, ValidationReport};

use crate::cli::{CredentialArgs, SheetArgs};

pub const CONFIRM_PROMPT: &str = "Do you want to apply the changes? (yes/no): ";

/// Records extracted from the input sheets
#[derive(Debug, Serialize)]
pub struct ScriptModel {
    pub topology: NetworkTopology,
    #[serde(flatten)]
    pub inventory: Inventory,
    pub users: Vec<User>,
}

impl ScriptModel {
    pub fn load(sheets: &SheetArgs) -> Result<Self> {
        let topology = NetworkTopology::load(&sheets.network).with_context(|| {
            format!(
                "Failed to load network configuration: {}",
                sheets.network.display()
            )
        })?;

        let inventory = Inventory::load(&sheets.machines, &sheets.partitions, &sheets.nics)
            .with_context(|| "Failed to load node, partition and NIC configuration")?;

        let users = match &sheets.users {
            Some(path) => load_users(path).with_context(|| {
                format!("Failed to load user configuration: {}", path.display())
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            topology,
            inventory,
            users,
        })
    }
}

/// A rendered script that passed validation
pub struct GeneratedScript {
    pub script: TerraformScript,
    pub text: String,
    pub report: ValidationReport,
}

pub fn load_credentials(args: &CredentialArgs) -> Result<Credentials> {
    Credentials::resolve(
        args.api_key.as_deref(),
        args.api_url.as_deref(),
        args.api_config.as_deref(),
    )
    .with_context(|| "Failed to resolve MAAS API credentials")
}

/// Assemble, render and validate the script
pub fn render_script(credentials: &Credentials, model: &ScriptModel) -> Result<GeneratedScript> {
    let script = TerraformScript::assemble(
        credentials,
        &model.topology,
        &model.inventory,
        &model.users,
    );
    let text = script.render();

    let report = DocumentValidator::new()
        .validate(&text)
        .with_context(|| "Generated script failed validation")?;

    Ok(GeneratedScript {
        script,
        text,
        report,
    })
}

/// Ask before applying; only an answer of `yes` proceeds
pub fn confirm_apply<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> std::io::Result<bool> {
    write!(output, "{}", CONFIRM_PROMPT)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

/// Confirmation on the controlling terminal unless `yes` was given
pub fn confirmation(yes: bool) -> terramaas_core::Result<bool> {
    if yes {
        return Ok(true);
    }
    let stdin = std::io::stdin();
    confirm_apply(&mut stdin.lock(), &mut std::io::stdout()).map_err(TerramaasError::from)
}

pub fn report_outcome(outcome: DeployOutcome) {
    match outcome {
        DeployOutcome::Aborted => println!("Aborted."),
        DeployOutcome::Applied => info!("Changes applied"),
        DeployOutcome::Destroyed => info!("Resources destroyed"),
    }
}
