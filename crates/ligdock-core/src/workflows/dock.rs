use crate::core::models::ligand::LigandRecord;
use crate::engine::config::DockingConfig;
use crate::engine::error::PipelineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scratch::ScratchArea;
use crate::engine::tools::{ToolInvocation, ToolRunner, run_checked};
use crate::workflows::report;
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// Subdirectory of the results directory holding shared grid maps.
pub const GRID_MAPS_DIR: &str = "grid_maps";

const MAP_EXTENSIONS: [&str; 3] = ["map", "fld", "xyz"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockingStage {
    Staging,
    GridGeneration,
    Search,
    Collection,
}

impl fmt::Display for DockingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DockingStage::Staging => "staging",
            DockingStage::GridGeneration => "grid generation",
            DockingStage::Search => "docking search",
            DockingStage::Collection => "log collection",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockingStatus {
    Docked { log: PathBuf },
    Failed { stage: DockingStage, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockingOutcome {
    pub ligand: String,
    pub status: DockingStatus,
}

impl DockingOutcome {
    pub fn is_docked(&self) -> bool {
        matches!(self.status, DockingStatus::Docked { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DockingReport {
    /// One outcome per ligand, in the order the ligands were collected.
    pub outcomes: Vec<DockingOutcome>,
    pub summary_path: Option<PathBuf>,
}

impl DockingReport {
    pub fn docked(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_docked()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DockingOutcome> {
        self.outcomes.iter().filter(|o| !o.is_docked())
    }
}

/// Every `*.pdbqt` file in `dir`, sorted by file name.
pub fn collect_ligands(dir: &Path) -> Result<Vec<LigandRecord>, PipelineError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(PipelineError::io(dir))? {
        let path = entry.map_err(PipelineError::io(dir))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "pdbqt") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths
        .iter()
        .filter_map(|p| LigandRecord::from_positioned(p))
        .collect())
}

/// Parameter files, receptor and grid maps shared by every job.
struct SharedInputs<'a> {
    config: &'a DockingConfig,
    maps: Option<Vec<PathBuf>>,
}

#[instrument(skip_all, name = "docking_workflow")]
pub fn run(
    config: &DockingConfig,
    runner: &dyn ToolRunner,
    reporter: &ProgressReporter,
) -> Result<DockingReport, PipelineError> {
    PipelineError::require("ligand directory", &config.ligands_dir)?;
    PipelineError::require("receptor", &config.receptor)?;
    PipelineError::require("grid parameter file", &config.grid_parameters)?;
    PipelineError::require("docking parameter file", &config.docking_parameters)?;

    let ligands = collect_ligands(&config.ligands_dir)?;
    fs::create_dir_all(&config.results_dir).map_err(PipelineError::io(&config.results_dir))?;

    info!(
        "Docking {} ligand(s) with {} worker(s)",
        ligands.len(),
        config.jobs
    );
    if ligands.is_empty() {
        warn!("No ligand structures found in {:?}", config.ligands_dir);
    }

    let outcomes = if config.reuse_maps {
        match generate_shared_maps(config, runner, reporter) {
            Ok(maps) => dock_all(
                &ligands,
                &SharedInputs {
                    config,
                    maps: Some(maps),
                },
                runner,
                reporter,
            )?,
            Err(e) => {
                error!("Shared grid map generation failed: {}", e);
                ligands
                    .iter()
                    .map(|ligand| {
                        reporter.item_failed(&ligand.id, &e);
                        DockingOutcome {
                            ligand: ligand.id.clone(),
                            status: DockingStatus::Failed {
                                stage: DockingStage::GridGeneration,
                                reason: e.to_string(),
                            },
                        }
                    })
                    .collect()
            }
        }
    } else {
        dock_all(
            &ligands,
            &SharedInputs { config, maps: None },
            runner,
            reporter,
        )?
    };

    let mut docking = DockingReport {
        outcomes,
        summary_path: None,
    };
    info!(
        "Docking complete: {}/{} ligand(s) docked",
        docking.docked(),
        docking.outcomes.len()
    );

    if config.run_analysis {
        let expected: Vec<String> = ligands.iter().map(|l| l.id.clone()).collect();
        let path = report::regenerate_docking_summary(
            &config.results_dir,
            &expected,
            config.favorable_threshold,
            &report::timestamp(),
        )?;
        reporter.report(Progress::Message(format!(
            "Docking summary written to {}",
            path.display()
        )));
        docking.summary_path = Some(path);
    }

    Ok(docking)
}

fn dock_all(
    ligands: &[LigandRecord],
    shared: &SharedInputs,
    runner: &dyn ToolRunner,
    reporter: &ProgressReporter,
) -> Result<Vec<DockingOutcome>, PipelineError> {
    reporter.report(Progress::PhaseStart { name: "Docking" });
    reporter.report(Progress::TaskStart {
        total_steps: ligands.len() as u64,
    });

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(shared.config.jobs)
        .build()
        .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

    let outcomes: Vec<DockingOutcome> = pool.install(|| {
        ligands
            .par_iter()
            .map(|ligand| {
                let status = match dock_ligand(ligand, shared, runner) {
                    Ok(log) => {
                        info!("Docked '{}' -> {:?}", ligand.id, log);
                        DockingStatus::Docked { log }
                    }
                    Err((stage, e)) => {
                        warn!("Ligand '{}' failed during {}: {}", ligand.id, stage, e);
                        reporter.item_failed(&ligand.id, format!("{}: {}", stage, e));
                        DockingStatus::Failed {
                            stage,
                            reason: e.to_string(),
                        }
                    }
                };
                reporter.report(Progress::TaskIncrement);
                DockingOutcome {
                    ligand: ligand.id.clone(),
                    status,
                }
            })
            .collect()
    });

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(outcomes)
}

/// Log file name the docking programs derive from a parameter file.
fn log_name(parameters: &Path, extension: &str) -> String {
    let stem = parameters
        .file_stem()
        .map_or_else(|| "docking".into(), |s| s.to_string_lossy());
    format!("{}.{}", stem, extension)
}

fn file_name(path: &Path) -> Result<String, PipelineError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| PipelineError::MissingInput {
            kind: "file name",
            path: path.to_path_buf(),
        })
}

fn grid_invocation(config: &DockingConfig, workdir: &Path) -> Result<ToolInvocation, PipelineError> {
    Ok(ToolInvocation::new(&config.tools.autogrid)
        .arg("-p")
        .arg(file_name(&config.grid_parameters)?)
        .arg("-l")
        .arg(log_name(&config.grid_parameters, "glg"))
        .current_dir(workdir))
}

fn dock_ligand(
    ligand: &LigandRecord,
    shared: &SharedInputs,
    runner: &dyn ToolRunner,
) -> Result<PathBuf, (DockingStage, PipelineError)> {
    let config = shared.config;
    let at = |stage: DockingStage| move |e: PipelineError| (stage, e);

    let source = ligand.positioned_path.as_deref().ok_or_else(|| {
        (
            DockingStage::Staging,
            PipelineError::MissingInput {
                kind: "ligand structure",
                path: PathBuf::from(&ligand.id),
            },
        )
    })?;

    let scratch = ScratchArea::create(config.scratch_root.as_deref(), &ligand.id)
        .map_err(at(DockingStage::Staging))?;
    debug!("Docking '{}' in {:?}", ligand.id, scratch.path());

    let result = dock_in_scratch(ligand, source, &scratch, shared, runner);
    scratch.close();
    result
}

fn dock_in_scratch(
    ligand: &LigandRecord,
    source: &Path,
    scratch: &ScratchArea,
    shared: &SharedInputs,
    runner: &dyn ToolRunner,
) -> Result<PathBuf, (DockingStage, PipelineError)> {
    let config = shared.config;
    let at = |stage: DockingStage| move |e: PipelineError| (stage, e);

    scratch
        .stage(&config.grid_parameters)
        .and_then(|_| scratch.stage(&config.docking_parameters))
        .and_then(|_| scratch.stage(&config.receptor))
        .and_then(|_| scratch.stage_as(source, &config.staged_ligand_name))
        .map_err(at(DockingStage::Staging))?;

    match &shared.maps {
        Some(maps) => {
            for map in maps {
                scratch.stage(map).map_err(at(DockingStage::Staging))?;
            }
        }
        None => {
            let invocation =
                grid_invocation(config, scratch.path()).map_err(at(DockingStage::GridGeneration))?;
            run_checked(runner, &invocation).map_err(at(DockingStage::GridGeneration))?;
        }
    }

    let dlg_name = log_name(&config.docking_parameters, "dlg");
    let search = ToolInvocation::new(&config.tools.autodock)
        .arg("-p")
        .arg(file_name(&config.docking_parameters).map_err(at(DockingStage::Search))?)
        .arg("-l")
        .arg(&dlg_name)
        .current_dir(scratch.path());
    run_checked(runner, &search).map_err(at(DockingStage::Search))?;

    let produced = scratch.path().join(&dlg_name);
    PipelineError::require("docking log", &produced).map_err(at(DockingStage::Collection))?;
    let dest = config.results_dir.join(format!("{}.dlg", ligand.id));
    fs::copy(&produced, &dest)
        .map_err(PipelineError::io(&dest))
        .map_err(at(DockingStage::Collection))?;
    Ok(dest)
}

/// Runs the grid generator once and keeps its maps under `<results>/grid_maps`.
fn generate_shared_maps(
    config: &DockingConfig,
    runner: &dyn ToolRunner,
    reporter: &ProgressReporter,
) -> Result<Vec<PathBuf>, PipelineError> {
    reporter.report(Progress::PhaseStart {
        name: "Generating shared grid maps",
    });
    let maps_dir = config.results_dir.join(GRID_MAPS_DIR);
    fs::create_dir_all(&maps_dir).map_err(PipelineError::io(&maps_dir))?;

    let scratch = ScratchArea::create(config.scratch_root.as_deref(), "grid_maps")?;
    let result = collect_maps(config, &scratch, &maps_dir, runner);
    scratch.close();
    if let Ok(maps) = &result {
        reporter.report(Progress::Message(format!(
            "{} shared grid map file(s) in {}",
            maps.len(),
            maps_dir.display()
        )));
    }
    reporter.report(Progress::PhaseFinish);
    result
}

fn collect_maps(
    config: &DockingConfig,
    scratch: &ScratchArea,
    maps_dir: &Path,
    runner: &dyn ToolRunner,
) -> Result<Vec<PathBuf>, PipelineError> {
    scratch.stage(&config.grid_parameters)?;
    scratch.stage(&config.receptor)?;
    run_checked(runner, &grid_invocation(config, scratch.path())?)?;

    let mut maps = Vec::new();
    for entry in fs::read_dir(scratch.path()).map_err(PipelineError::io(scratch.path()))? {
        let path = entry.map_err(PipelineError::io(scratch.path()))?.path();
        let is_map = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| MAP_EXTENSIONS.contains(&e));
        if !is_map {
            continue;
        }
        let dest = maps_dir.join(file_name(&path)?);
        fs::copy(&path, &dest).map_err(PipelineError::io(&dest))?;
        maps.push(dest);
    }
    if maps.is_empty() {
        return Err(PipelineError::MissingInput {
            kind: "grid maps",
            path: scratch.path().to_path_buf(),
        });
    }
    maps.sort();
    info!("Generated {} shared grid map file(s) in {:?}", maps.len(), maps_dir);
    Ok(maps)
}
