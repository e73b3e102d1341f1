use crate::cli::ReportArgs;
use crate::config::{FileConfig, build_report_settings};
use crate::error::Result;
use ligdock::workflows::{dock::collect_ligands, report};
use tracing::info;

pub async fn run(args: ReportArgs, file_config: &FileConfig) -> Result<()> {
    let settings = build_report_settings(&args, file_config);

    let expected: Vec<String> = match &settings.ligands_dir {
        Some(dir) => collect_ligands(dir)?.into_iter().map(|l| l.id).collect(),
        None => Vec::new(),
    };
    info!(
        "Summarizing {:?} with {} expected ligand(s)",
        settings.results_dir,
        expected.len()
    );

    let path = report::regenerate_docking_summary(
        &settings.results_dir,
        &expected,
        settings.favorable_threshold,
        &report::timestamp(),
    )?;
    println!("Docking summary written to: {}", path.display());
    Ok(())
}
