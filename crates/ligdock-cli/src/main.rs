mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("🚀 ligdock CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let file_config = config::load(cli.config.as_deref(), &cli.set_values)?;
    debug!("Merged file configuration: {:?}", &file_config);

    let command_result = match cli.command {
        Commands::Prepare(args) => {
            info!("Dispatching to 'prepare' command.");
            commands::prepare::run(args, &file_config).await
        }
        Commands::Dock(args) => {
            info!("Dispatching to 'dock' command.");
            commands::dock::run(args, &file_config).await
        }
        Commands::Extract(args) => {
            info!("Dispatching to 'extract' command.");
            commands::extract::run(args, &file_config).await
        }
        Commands::Report(args) => {
            info!("Dispatching to 'report' command.");
            commands::report::run(args, &file_config).await
        }
    };

    match &command_result {
        Ok(_) => {
            info!("✅ Command completed successfully.");
            println!("✅ Command completed successfully.");
        }
        Err(e) => {
            error!("❌ Command failed: {}", e);
        }
    }

    command_result
}
