//! Generate command

use std::io::Write;

use anyhow::{Context, Result};

use super::{load_credentials, render_script, ScriptModel};
use crate::cli::{GenerateArgs, OutputFormat};

/// Generate command implementation
pub struct GenerateCommand;

impl GenerateCommand {
    pub fn new() -> Self {
        Self
    }

    /// Write the validated script, or the extracted records as JSON
    pub fn execute<W: Write>(&self, args: &GenerateArgs, out: &mut W) -> Result<()> {
        let model = ScriptModel::load(&args.sheets)?;

        match args.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &model)
                    .with_context(|| "Failed to serialize extracted records")?;
                writeln!(out)?;
            }
            OutputFormat::Hcl => {
                let credentials = load_credentials(&args.credentials)?;
                let generated = render_script(&credentials, &model)?;
                out.write_all(generated.text.as_bytes())
                    .with_context(|| "Failed to write generated script")?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

impl Default for GenerateCommand {
    fn default() -> Self {
        Self::new()
    }
}
