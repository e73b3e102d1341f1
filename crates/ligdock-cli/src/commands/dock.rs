use crate::cli::DockArgs;
use crate::config::{FileConfig, build_docking_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use ligdock::engine::progress::ProgressReporter;
use ligdock::engine::tools::SystemToolRunner;
use ligdock::workflows::{self, dock::DockingStatus};
use tracing::{info, warn};

pub async fn run(args: DockArgs, file_config: &FileConfig) -> Result<()> {
    let config = build_docking_config(&args, file_config)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Docking ligands from {} against {} ({} job(s){})...",
        config.ligands_dir.display(),
        config.receptor.display(),
        config.jobs,
        if config.reuse_maps { ", shared maps" } else { "" }
    );
    info!("Invoking the docking workflow...");

    let report = tokio::task::block_in_place(|| {
        workflows::dock::run(&config, &SystemToolRunner, &reporter)
    })?;

    println!(
        "Docked {}/{} ligand(s). Logs are in: {}",
        report.docked(),
        report.outcomes.len(),
        config.results_dir.display()
    );
    for outcome in report.failed() {
        if let DockingStatus::Failed { stage, reason } = &outcome.status {
            println!("  ✗ {} failed during {}: {}", outcome.ligand, stage, reason);
        }
    }
    match &report.summary_path {
        Some(path) => println!("Docking summary written to: {}", path.display()),
        None => warn!("Analysis skipped; run 'ligdock report' to build the summary later."),
    }
    Ok(())
}
