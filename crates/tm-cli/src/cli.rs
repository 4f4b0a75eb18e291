//! Command line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use terramaas_apply::{DEFAULT_SCRIPT_NAME, DEFAULT_TERRAFORM};

#[derive(Debug, Parser)]
#[command(name = "terramaas")]
#[command(about = "Generate a MAAS terraform script from CSV sheets and apply it")]
#[command(version)]
#[command(long_about = "
Terramaas

Reads a network topology sheet plus machine, partition, NIC and user sheets,
renders a terraform script for the MAAS provider and drives terraform to
apply or destroy it.

Examples:
  terramaas create -n network.csv -p partitions.csv -b machines.csv -i nics.csv -a maas.yaml
  terramaas update -d ./deploy -n network.csv -p partitions.csv -b machines.csv -i nics.csv -a maas.yaml
  terramaas destroy -d ./deploy
  terramaas generate -n network.csv -p partitions.csv -b machines.csv -i nics.csv --api-key k --api-url http://maas:5240/MAAS
")]
#[command(after_help = "Thanks for using Terramaas!")]
pub struct Cli {
    /// Terraform executable
    #[arg(long, global = true, env = "TERRAMAAS_TERRAFORM", default_value = DEFAULT_TERRAFORM)]
    pub terraform: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a terraform script from the sheets and apply it
    Create(CreateArgs),

    /// Regenerate and re-apply the script of an applied directory
    Update(UpdateArgs),

    /// Destroy everything an applied directory manages
    Destroy(DestroyArgs),

    /// Print the generated script without running terraform
    Generate(GenerateArgs),
}

/// Input sheets
#[derive(Debug, Clone, Args)]
pub struct SheetArgs {
    /// The CSV file containing the network configuration
    #[arg(short = 'n', long = "network-config", value_name = "FILE")]
    pub network: PathBuf,

    /// The CSV file containing the partition configuration
    #[arg(short = 'p', long = "partition-config", value_name = "FILE")]
    pub partitions: PathBuf,

    /// The CSV file containing the node configuration
    #[arg(short = 'b', long = "node-config", value_name = "FILE")]
    pub machines: PathBuf,

    /// The CSV file containing the NIC configuration
    #[arg(short = 'i', long = "nics-config", value_name = "FILE")]
    pub nics: PathBuf,

    /// The CSV file containing the user configuration
    #[arg(short = 'u', long = "user-config", value_name = "FILE")]
    pub users: Option<PathBuf>,
}

/// MAAS API credentials
#[derive(Debug, Clone, Args)]
pub struct CredentialArgs {
    /// The MAAS API key
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// The MAAS API url
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// YAML file with the MAAS API key and url
    #[arg(short = 'a', long, value_name = "FILE")]
    pub api_config: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub sheets: SheetArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// The output file
    #[arg(short, long, value_name = "FILE", default_value = "./terraform_script.tf")]
    pub output: PathBuf,

    /// Skip the prompt to apply the changes
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Clone, Args)]
pub struct UpdateArgs {
    /// The directory containing the terraform script
    #[arg(short, long, value_name = "DIR", default_value = "./")]
    pub directory: PathBuf,

    #[command(flatten)]
    pub sheets: SheetArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Script file name inside the directory
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_SCRIPT_NAME)]
    pub output: String,

    /// Skip the prompt to apply the changes
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DestroyArgs {
    /// The directory containing the terraform script
    #[arg(short, long, value_name = "DIR", default_value = "./")]
    pub directory: PathBuf,

    /// Destroy without terraform asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Terraform script
    Hcl,
    /// Extracted records as JSON
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub sheets: SheetArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Hcl)]
    pub format: OutputFormat,
}
