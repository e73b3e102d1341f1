use crate::cli::PrepareArgs;
use crate::config::{FileConfig, build_preparation_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use ligdock::engine::progress::ProgressReporter;
use ligdock::engine::tools::SystemToolRunner;
use ligdock::workflows;
use tracing::info;

pub async fn run(args: PrepareArgs, file_config: &FileConfig) -> Result<()> {
    let config = build_preparation_config(&args, file_config)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Preparing ligands from {} (target {:.3}, {:.3}, {:.3})...",
        config.ligand_list.display(),
        config.target.x,
        config.target.y,
        config.target.z
    );
    info!("Invoking the preparation workflow...");

    let summary = tokio::task::block_in_place(|| {
        workflows::prepare::run(&config, &SystemToolRunner, &reporter)
    })?;

    println!(
        "Prepared {}/{} ligand(s).",
        summary.prepared.len(),
        summary.total
    );
    for failure in &summary.failures {
        println!(
            "  ✗ {} failed at {}: {}",
            failure.ligand, failure.stage, failure.reason
        );
    }
    if !summary.prepared.is_empty() {
        let positioned = config.output_dir.join("positioned");
        println!("Positioned PDBQT files are in: {}", positioned.display());
        println!(
            "Next: ligdock dock --ligands {} --receptor <receptor.pdbqt> --grid-params <grid.gpf> --dock-params <dock.dpf>",
            positioned.display()
        );
    }
    Ok(())
}
