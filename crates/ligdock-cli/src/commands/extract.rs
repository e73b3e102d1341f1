use crate::cli::ExtractArgs;
use crate::config::{FileConfig, build_extraction_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use ligdock::engine::progress::ProgressReporter;
use ligdock::workflows::{self, extract::ExtractionStatus};
use tracing::info;

pub async fn run(args: ExtractArgs, file_config: &FileConfig) -> Result<()> {
    let config = build_extraction_config(&args, file_config)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Extracting best poses from {} (cutoff {:.2} kcal/mol)...",
        config.results_dir.display(),
        config.energy_cutoff
    );
    info!("Invoking the extraction workflow...");

    let summary =
        tokio::task::block_in_place(|| workflows::extract::run(&config, &reporter))?;

    for record in &summary.records {
        match (record.status, record.energy) {
            (ExtractionStatus::Extracted, Some(energy)) => {
                println!("  ✓ {}: {:.2} kcal/mol", record.ligand, energy)
            }
            (ExtractionStatus::WeakBinding, Some(energy)) => {
                println!("  ! {}: {:.2} kcal/mol (weak binding)", record.ligand, energy)
            }
            (status, _) => println!("  ✗ {}: {}", record.ligand, status.label()),
        }
    }
    println!(
        "Extracted {}/{} pose(s) into {}. Summary: {}",
        summary.extracted(),
        summary.records.len(),
        config.output_dir.display(),
        summary.summary_path.display()
    );
    Ok(())
}
