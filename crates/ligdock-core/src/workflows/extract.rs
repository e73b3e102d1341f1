use crate::core::io::dlg::{DockingLog, PoseBlock, parse_docking_log};
use crate::core::io::pose::write_pose;
use crate::core::models::pose::{BestPose, PoseClass, SelectionStrategy};
use crate::engine::config::ExtractionConfig;
use crate::engine::error::PipelineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::workflows::report::{self, EXTRACTION_SUMMARY_FILE};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Energy, run and cluster size of the best result, before geometry lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub energy: f64,
    pub run: u32,
    pub cluster_size: Option<u32>,
    pub strategy: SelectionStrategy,
}

/// Picks the best result of a log.
///
/// The first cluster row wins when a clustering section exists, since the
/// docking program prints clusters best first. Otherwise the run with the
/// lowest energy wins; ties go to the run that appears first.
pub fn select_best(log: &DockingLog) -> Option<Selection> {
    if let Some(first) = log.cluster_entries().first() {
        return Some(Selection {
            energy: first.lowest_energy,
            run: first.run,
            cluster_size: Some(first.size),
            strategy: SelectionStrategy::Cluster,
        });
    }

    let mut best = None;
    for record in log.runs() {
        match best {
            Some((energy, _)) if record.energy >= energy => {}
            _ => best = Some((record.energy, record.run)),
        }
    }
    best.map(|(energy, run)| Selection {
        energy,
        run,
        cluster_size: None,
        strategy: SelectionStrategy::RunScan,
    })
}

fn locate_geometry<'a>(log: &'a DockingLog, selection: &Selection) -> Option<&'a PoseBlock> {
    let matches_run = |b: &&PoseBlock| b.has_atoms() && b.run_index() == Some(selection.run);
    let matches_energy = |b: &&PoseBlock| b.has_atoms() && b.energy == Some(selection.energy);

    let from_clusters = match (&log.clustering, selection.strategy) {
        (Some(section), SelectionStrategy::Cluster) => section
            .representatives
            .iter()
            .find(matches_run)
            .or_else(|| section.representatives.iter().find(|b| b.has_atoms())),
        _ => None,
    };

    from_clusters
        .or_else(|| log.run_blocks.iter().find(matches_run))
        .or_else(|| log.all_blocks().find(matches_energy))
}

/// Selects the best pose of `log` and attaches its atom lines.
pub fn select_best_pose(ligand: &str, log: &DockingLog) -> Result<BestPose, PipelineError> {
    let selection = select_best(log).ok_or_else(|| PipelineError::NoBindingEnergies {
        ligand: ligand.to_string(),
    })?;
    let block = locate_geometry(log, &selection).ok_or(PipelineError::PoseNotFound {
        run: selection.run,
        energy: selection.energy,
    })?;
    debug!(
        "'{}': run {} at {:.2} kcal/mol via {:?}",
        ligand, selection.run, selection.energy, selection.strategy
    );
    Ok(BestPose {
        ligand: ligand.to_string(),
        energy: selection.energy,
        run: selection.run,
        cluster_size: selection.cluster_size,
        strategy: selection.strategy,
        atom_lines: block.atom_lines.clone(),
    })
}

/// Applies the energy cutoff and the cluster-size floor. An energy equal to
/// the cutoff passes.
pub fn classify(pose: &BestPose, config: &ExtractionConfig) -> PoseClass {
    let too_weak = pose.energy > config.energy_cutoff;
    let too_rare = pose
        .cluster_size
        .is_some_and(|size| size < config.min_cluster_size);
    if too_weak || too_rare {
        PoseClass::Weak
    } else {
        PoseClass::Acceptable
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Written {
        pose: BestPose,
        class: PoseClass,
        path: PathBuf,
    },
    /// Weak pose dropped because weak poses are not kept.
    Discarded { pose: BestPose },
}

pub fn best_pose_path(output_dir: &Path, ligand: &str) -> PathBuf {
    output_dir.join(format!("{}_best.pdbqt", ligand))
}

fn remove_stale(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("Could not remove stale pose file {:?}: {}", path, e);
        }
    }
}

/// Extracts the best pose of one docking log into `<output_dir>/<id>_best.pdbqt`.
///
/// Any earlier pose file for the ligand is removed when this log yields no
/// acceptable pose, so the output directory always reflects the latest pass.
pub fn extract_log(
    log_path: &Path,
    config: &ExtractionConfig,
    extracted_at: &str,
) -> Result<ExtractionOutcome, PipelineError> {
    let ligand = report::ligand_id(log_path);
    let output = best_pose_path(&config.output_dir, &ligand);

    let result = extract_into(log_path, &ligand, &output, config, extracted_at);
    match &result {
        Ok(ExtractionOutcome::Written { .. }) => {}
        _ => remove_stale(&output),
    }
    result
}

fn extract_into(
    log_path: &Path,
    ligand: &str,
    output: &Path,
    config: &ExtractionConfig,
    extracted_at: &str,
) -> Result<ExtractionOutcome, PipelineError> {
    PipelineError::require("docking log", log_path)?;
    let bytes = fs::read(log_path).map_err(PipelineError::io(log_path))?;
    let log = parse_docking_log(&String::from_utf8_lossy(&bytes));

    let pose = select_best_pose(ligand, &log)?;
    let class = classify(&pose, config);
    if class == PoseClass::Weak && !config.keep_weak {
        return Ok(ExtractionOutcome::Discarded { pose });
    }

    let file = File::create(output).map_err(PipelineError::io(output))?;
    let mut writer = BufWriter::new(file);
    write_pose(&pose, class, extracted_at, &mut writer)
        .and_then(|_| writer.flush())
        .map_err(PipelineError::io(output))?;

    Ok(ExtractionOutcome::Written {
        pose,
        class,
        path: output.to_path_buf(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    Extracted,
    WeakBinding,
    Rejected,
    NoEnergies,
    Failed,
}

impl ExtractionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ExtractionStatus::Extracted => "extracted",
            ExtractionStatus::WeakBinding => "weak",
            ExtractionStatus::Rejected => "rejected",
            ExtractionStatus::NoEnergies => "no energies",
            ExtractionStatus::Failed => "failed",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExtractionStatus::Extracted | ExtractionStatus::WeakBinding)
    }
}

/// One row of the extraction summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRecord {
    pub ligand: String,
    pub status: ExtractionStatus,
    pub energy: Option<f64>,
    pub run: Option<u32>,
    pub cluster_size: Option<u32>,
    pub class: Option<PoseClass>,
    pub output: Option<PathBuf>,
}

impl ExtractionRecord {
    fn from_result(ligand: String, result: &Result<ExtractionOutcome, PipelineError>) -> Self {
        let empty = |status| Self {
            ligand: ligand.clone(),
            status,
            energy: None,
            run: None,
            cluster_size: None,
            class: None,
            output: None,
        };
        match result {
            Ok(ExtractionOutcome::Written { pose, class, path }) => Self {
                status: match class {
                    PoseClass::Acceptable => ExtractionStatus::Extracted,
                    PoseClass::Weak => ExtractionStatus::WeakBinding,
                },
                energy: Some(pose.energy),
                run: Some(pose.run),
                cluster_size: pose.cluster_size,
                class: Some(*class),
                output: Some(path.clone()),
                ..empty(ExtractionStatus::Extracted)
            },
            Ok(ExtractionOutcome::Discarded { pose }) => Self {
                energy: Some(pose.energy),
                run: Some(pose.run),
                cluster_size: pose.cluster_size,
                class: Some(PoseClass::Weak),
                ..empty(ExtractionStatus::Rejected)
            },
            Err(PipelineError::NoBindingEnergies { .. }) => empty(ExtractionStatus::NoEnergies),
            Err(_) => empty(ExtractionStatus::Failed),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    pub records: Vec<ExtractionRecord>,
    pub summary_path: PathBuf,
}

impl ExtractionSummary {
    pub fn extracted(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_success()).count()
    }
}

#[instrument(skip_all, name = "extraction_workflow")]
pub fn run(
    config: &ExtractionConfig,
    reporter: &ProgressReporter,
) -> Result<ExtractionSummary, PipelineError> {
    PipelineError::require("results directory", &config.results_dir)?;
    let logs = report::list_logs(&config.results_dir)?;
    fs::create_dir_all(&config.output_dir).map_err(PipelineError::io(&config.output_dir))?;

    info!(
        "Extracting best poses from {} log(s) (cutoff {:.2} kcal/mol)",
        logs.len(),
        config.energy_cutoff
    );
    reporter.report(Progress::PhaseStart {
        name: "Extracting best poses",
    });
    reporter.report(Progress::TaskStart {
        total_steps: logs.len() as u64,
    });

    let extracted_at = report::timestamp();
    let mut records = Vec::with_capacity(logs.len());
    for log in &logs {
        let ligand = report::ligand_id(log);
        let result = extract_log(log, config, &extracted_at);
        match &result {
            Ok(ExtractionOutcome::Written { pose, class, .. }) => {
                info!("'{}': {:.2} kcal/mol ({})", ligand, pose.energy, class);
            }
            Ok(ExtractionOutcome::Discarded { pose }) => {
                warn!(
                    "'{}': best energy {:.2} kcal/mol fails the cutoff; no pose written",
                    ligand, pose.energy
                );
            }
            Err(e) => {
                warn!("'{}': {}", ligand, e);
                reporter.item_failed(&ligand, e);
            }
        }
        records.push(ExtractionRecord::from_result(ligand, &result));
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    let summary_path = config.output_dir.join(EXTRACTION_SUMMARY_FILE);
    let file = File::create(&summary_path).map_err(PipelineError::io(&summary_path))?;
    report::write_extraction_summary(&records, &extracted_at, BufWriter::new(file))?;
    reporter.report(Progress::PhaseFinish);

    let summary = ExtractionSummary {
        records,
        summary_path,
    };
    info!(
        "Extraction complete: {}/{} pose(s) written",
        summary.extracted(),
        summary.records.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::dlg::fixtures::*;
    use crate::engine::config::ExtractionConfigBuilder;
    use tempfile::{TempDir, tempdir};

    const STAMP: &str = "2026-01-01 12:00:00";

    fn clustered_log() -> String {
        format!(
            "{}{}{}{}{}{}",
            docked_block(3, -9.5, 1.0),
            docked_block(7, -8.1, 2.0),
            histogram(&[(1, -9.5, 3, -9.2, 10), (2, -8.1, 7, -8.0, 4)]),
            REPRESENTATIVES_HEADER,
            representative(3, 1, 10, -9.5, 5.0),
            representative(7, 2, 4, -8.1, 6.0)
        )
    }

    fn run_only_log() -> String {
        format!(
            "{}{}{}",
            docked_block(1, -6.2, 1.0),
            docked_block(2, -7.8, 2.0),
            docked_block(3, -5.0, 3.0)
        )
    }

    fn setup(logs: &[(&str, String)]) -> (TempDir, ExtractionConfigBuilder) {
        let dir = tempdir().unwrap();
        let results = dir.path().join("results");
        fs::create_dir_all(&results).unwrap();
        for (name, text) in logs {
            fs::write(results.join(format!("{}.dlg", name)), text).unwrap();
        }
        let builder = ExtractionConfigBuilder::new()
            .results_dir(results)
            .output_dir(dir.path().join("poses"));
        (dir, builder)
    }

    #[test]
    fn clustering_section_takes_first_cluster() {
        let log = parse_docking_log(&clustered_log());
        let pose = select_best_pose("lig", &log).unwrap();

        assert_eq!(pose.energy, -9.5);
        assert_eq!(pose.run, 3);
        assert_eq!(pose.cluster_size, Some(10));
        assert_eq!(pose.strategy, SelectionStrategy::Cluster);
        assert!(pose.atom_lines[0].contains("   5.000"));
    }

    #[test]
    fn cluster_without_representatives_uses_run_block() {
        let text = format!(
            "{}{}{}",
            docked_block(7, -8.1, 2.0),
            docked_block(3, -9.5, 1.0),
            histogram(&[(1, -9.5, 3, -9.2, 10)])
        );
        let pose = select_best_pose("lig", &parse_docking_log(&text)).unwrap();
        assert_eq!(pose.run, 3);
        assert!(pose.atom_lines[0].contains("   1.000"));
    }

    #[test]
    fn run_scan_picks_lowest_energy() {
        let log = parse_docking_log(&run_only_log());
        let pose = select_best_pose("lig", &log).unwrap();

        assert_eq!(pose.run, 2);
        assert_eq!(pose.energy, -7.8);
        assert_eq!(pose.cluster_size, None);
        assert_eq!(pose.strategy, SelectionStrategy::RunScan);
        assert!(pose.atom_lines[0].contains("   2.000"));
    }

    #[test]
    fn run_scan_ties_go_to_first_run() {
        let text = format!("{}{}", docked_block(4, -7.0, 4.0), docked_block(2, -7.0, 2.0));
        let pose = select_best_pose("lig", &parse_docking_log(&text)).unwrap();
        assert_eq!(pose.run, 4);
    }

    #[test]
    fn log_without_energies_is_reported() {
        let log = parse_docking_log("AutoDock 4.2 started\nsegmentation fault\n");
        let result = select_best_pose("lig", &log);
        assert!(matches!(result, Err(PipelineError::NoBindingEnergies { .. })));
    }

    #[test]
    fn missing_geometry_is_pose_not_found() {
        let text = histogram(&[(1, -9.5, 3, -9.2, 10)]);
        let result = select_best_pose("lig", &parse_docking_log(&text));
        assert!(matches!(
            result,
            Err(PipelineError::PoseNotFound { run: 3, .. })
        ));
    }

    #[test]
    fn classification_honors_cutoff_and_cluster_floor() {
        let (_dir, builder) = setup(&[]);
        let config = builder.min_cluster_size(5).build().unwrap();
        let log = parse_docking_log(&clustered_log());
        let mut pose = select_best_pose("lig", &log).unwrap();

        assert_eq!(classify(&pose, &config), PoseClass::Acceptable);
        pose.energy = -5.0;
        assert_eq!(classify(&pose, &config), PoseClass::Acceptable);
        pose.energy = -4.99;
        assert_eq!(classify(&pose, &config), PoseClass::Weak);
        pose.energy = -9.5;
        pose.cluster_size = Some(2);
        assert_eq!(classify(&pose, &config), PoseClass::Weak);
    }

    #[test]
    fn extraction_pass_writes_poses_and_summary() {
        let (dir, builder) = setup(&[("aspirin", clustered_log()), ("ibuprofen", run_only_log())]);
        let config = builder.build().unwrap();

        let summary = run(&config, &ProgressReporter::new()).unwrap();

        assert_eq!(summary.extracted(), 2);
        let pose_file = dir.path().join("poses/aspirin_best.pdbqt");
        let text = fs::read_to_string(&pose_file).unwrap();
        assert!(text.starts_with("REMARK  Ligand: aspirin\n"));
        assert!(text.contains("REMARK  Binding energy: -9.50 kcal/mol"));
        assert!(text.contains("REMARK  Cluster size: 10"));
        assert!(text.ends_with("END\n"));
        assert!(dir.path().join("poses/ibuprofen_best.pdbqt").exists());

        let table = fs::read_to_string(&summary.summary_path).unwrap();
        assert!(table.contains("aspirin\textracted\t-9.50\t3\t10\tacceptable"));
        assert!(table.contains("ibuprofen\textracted\t-7.80\t2\t-\tacceptable"));
    }

    #[test]
    fn weak_pose_is_discarded_and_stale_file_removed() {
        let (dir, builder) = setup(&[("weak", docked_block(1, -4.0, 1.0))]);
        let config = builder.build().unwrap();
        fs::create_dir_all(dir.path().join("poses")).unwrap();
        let stale = dir.path().join("poses/weak_best.pdbqt");
        fs::write(&stale, "old pose").unwrap();

        let summary = run(&config, &ProgressReporter::new()).unwrap();

        assert!(!stale.exists());
        assert_eq!(summary.records[0].status, ExtractionStatus::Rejected);
        assert_eq!(summary.extracted(), 0);
        let table = fs::read_to_string(&summary.summary_path).unwrap();
        assert!(table.contains("weak\trejected\t-4.00\t1\t-\tweak binding\t-"));
    }

    #[test]
    fn weak_pose_is_kept_when_requested() {
        let (dir, builder) = setup(&[("weak", docked_block(1, -4.0, 1.0))]);
        let config = builder.keep_weak(true).build().unwrap();

        let summary = run(&config, &ProgressReporter::new()).unwrap();

        assert_eq!(summary.records[0].status, ExtractionStatus::WeakBinding);
        let text = fs::read_to_string(dir.path().join("poses/weak_best.pdbqt")).unwrap();
        assert!(text.contains("REMARK  Classification: weak binding"));
    }

    #[test]
    fn failures_leave_no_pose_and_do_not_stop_the_pass() {
        let (dir, builder) = setup(&[
            ("a_empty", "nothing useful\n".to_string()),
            ("b_lost", histogram(&[(1, -9.5, 3, -9.2, 10)])),
            ("c_good", run_only_log()),
        ]);
        let config = builder.build().unwrap();

        let summary = run(&config, &ProgressReporter::new()).unwrap();

        let statuses: Vec<_> = summary.records.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                ExtractionStatus::NoEnergies,
                ExtractionStatus::Failed,
                ExtractionStatus::Extracted
            ]
        );
        assert!(!dir.path().join("poses/a_empty_best.pdbqt").exists());
        assert!(!dir.path().join("poses/b_lost_best.pdbqt").exists());
    }

    #[test]
    fn missing_results_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let config = ExtractionConfigBuilder::new()
            .results_dir(dir.path().join("absent"))
            .output_dir(dir.path().join("poses"))
            .build()
            .unwrap();
        let result = run(&config, &ProgressReporter::new());
        assert!(matches!(result, Err(PipelineError::MissingInput { .. })));
        assert!(!dir.path().join("poses").exists());
    }

    #[test]
    fn missing_log_fails_without_output() {
        let (dir, builder) = setup(&[]);
        let config = builder.build().unwrap();
        let result = extract_log(&dir.path().join("results/ghost.dlg"), &config, STAMP);
        assert!(matches!(result, Err(PipelineError::MissingInput { .. })));
    }
}
