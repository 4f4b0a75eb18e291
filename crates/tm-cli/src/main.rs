//! Terramaas CLI (terramaas)

use clap::Parser;
use terramaas::cli::{Cli, Commands};
use terramaas::commands::{CreateCommand, DestroyCommand, GenerateCommand, UpdateCommand};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = match &cli.command {
        Commands::Create(args) => CreateCommand::new(&cli.terraform).execute(args).await,
        Commands::Update(args) => UpdateCommand::new(&cli.terraform).execute(args).await,
        Commands::Destroy(args) => DestroyCommand::new(&cli.terraform).execute(args).await,
        Commands::Generate(args) => {
            let stdout = std::io::stdout();
            GenerateCommand::new().execute(args, &mut stdout.lock())
        }
    };

    // Handle errors with appropriate exit codes
    match result {
        Ok(()) => {
            log::info!("Command completed successfully");
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);

            // Print error chain if in verbose mode
            if cli.verbose || cli.debug {
                for cause in e.chain().skip(1) {
                    eprintln!("  Caused by: {}", cause);
                }
            }
            std::process::exit(1);
        }
    }
}
