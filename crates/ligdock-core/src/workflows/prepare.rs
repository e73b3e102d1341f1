use crate::core::io::ligand_list::{LigandEntry, read_ligand_list};
use crate::core::models::ligand::LigandRecord;
use crate::engine::config::{PreparationConfig, ToolPaths};
use crate::engine::error::PipelineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tools::{ToolInvocation, ToolRunner, run_checked};
use crate::workflows::reposition::reposition_ligand;
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparationStage {
    Embedding,
    Parameterization,
    Repositioning,
}

impl fmt::Display for PreparationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PreparationStage::Embedding => "SMILES to 3-D structure",
            PreparationStage::Parameterization => "structure to PDBQT",
            PreparationStage::Repositioning => "repositioning",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparationFailure {
    pub ligand: String,
    pub stage: PreparationStage,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparationSummary {
    pub total: usize,
    pub prepared: Vec<LigandRecord>,
    pub failures: Vec<PreparationFailure>,
}

/// Output layout: one subdirectory per artifact kind.
#[derive(Debug, Clone)]
pub struct PreparedLayout {
    pub structures: PathBuf,
    pub parameterized: PathBuf,
    pub positioned: PathBuf,
}

impl PreparedLayout {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            structures: output_dir.join("pdb"),
            parameterized: output_dir.join("pdbqt"),
            positioned: output_dir.join("positioned"),
        }
    }

    fn create(&self) -> Result<(), PipelineError> {
        for dir in [&self.structures, &self.parameterized, &self.positioned] {
            fs::create_dir_all(dir).map_err(PipelineError::io(dir))?;
        }
        Ok(())
    }
}

#[instrument(skip_all, name = "preparation_workflow")]
pub fn run(
    config: &PreparationConfig,
    runner: &dyn ToolRunner,
    reporter: &ProgressReporter,
) -> Result<PreparationSummary, PipelineError> {
    PipelineError::require("ligand list", &config.ligand_list)?;
    let file = File::open(&config.ligand_list).map_err(PipelineError::io(&config.ligand_list))?;
    let entries =
        read_ligand_list(BufReader::new(file)).map_err(PipelineError::io(&config.ligand_list))?;

    let layout = PreparedLayout::new(&config.output_dir);
    layout.create()?;

    info!(
        "Preparing {} ligand(s) centered at ({:.3}, {:.3}, {:.3})",
        entries.len(),
        config.target.x,
        config.target.y,
        config.target.z
    );
    reporter.report(Progress::PhaseStart {
        name: "Preparing ligands",
    });
    reporter.report(Progress::TaskStart {
        total_steps: entries.len() as u64,
    });

    let mut summary = PreparationSummary {
        total: entries.len(),
        ..Default::default()
    };

    for entry in &entries {
        match prepare_ligand(entry, &layout, config, runner) {
            Ok(record) => {
                info!("Prepared ligand '{}'", record.id);
                summary.prepared.push(record);
            }
            Err(failure) => {
                warn!(
                    "Ligand '{}' failed at {}: {}",
                    failure.ligand, failure.stage, failure.reason
                );
                reporter.item_failed(&failure.ligand, format!("{}: {}", failure.stage, failure.reason));
                summary.failures.push(failure);
            }
        }
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    info!(
        "Preparation complete: {}/{} ligand(s) prepared",
        summary.prepared.len(),
        summary.total
    );
    Ok(summary)
}

fn prepare_ligand(
    entry: &LigandEntry,
    layout: &PreparedLayout,
    config: &PreparationConfig,
    runner: &dyn ToolRunner,
) -> Result<LigandRecord, PreparationFailure> {
    let fail = |stage: PreparationStage| {
        move |e: PipelineError| PreparationFailure {
            ligand: entry.id.clone(),
            stage,
            reason: e.to_string(),
        }
    };

    let mut record = LigandRecord::from_smiles(&entry.id, &entry.smiles);

    let structure = layout.structures.join(format!("{}.pdb", entry.id));
    embed_smiles(&entry.smiles, &structure, &config.tools, runner)
        .map_err(fail(PreparationStage::Embedding))?;
    record.structure_path = Some(structure.clone());

    let prepared = layout.parameterized.join(format!("{}.pdbqt", entry.id));
    parameterize(&structure, &prepared, &config.tools, runner)
        .map_err(fail(PreparationStage::Parameterization))?;
    record.prepared_path = Some(prepared.clone());

    let positioned = layout.positioned.join(format!("{}.pdbqt", entry.id));
    reposition_ligand(&prepared, &config.target, &positioned)
        .map_err(fail(PreparationStage::Repositioning))?;
    record.positioned_path = Some(positioned);

    Ok(record)
}

/// Generates a 3-D structure from SMILES with Open Babel.
pub fn embed_smiles(
    smiles: &str,
    output: &Path,
    tools: &ToolPaths,
    runner: &dyn ToolRunner,
) -> Result<(), PipelineError> {
    remove_stale(output)?;
    let invocation = ToolInvocation::new(&tools.obabel)
        .arg(format!("-:{}", smiles))
        .arg("-opdb")
        .arg("--gen3d")
        .arg("-O")
        .path_arg(output);
    run_checked(runner, &invocation)?;
    PipelineError::require("embedded structure", output)
}

/// Conversion routes to PDBQT, tried in order.
pub fn parameterization_routes(
    structure: &Path,
    output: &Path,
    tools: &ToolPaths,
) -> Vec<ToolInvocation> {
    let script = format!(
        "import sys\n\
         sys.path.append('{}')\n\
         from AutoDockTools.MoleculePreparation import AD4LigandPreparation\n\
         prep = AD4LigandPreparation()\n\
         prep.prepare_ligand('{}', outputfilename='{}', repairs='checkhydrogens', charges_to_add='gasteiger')\n",
        python_quote(Path::new(&tools.mgltools_site_packages)),
        python_quote(structure),
        python_quote(output)
    );
    vec![
        ToolInvocation::new(&tools.prepare_ligand)
            .arg("-l")
            .path_arg(structure)
            .arg("-o")
            .path_arg(output)
            .arg("-A")
            .arg("hydrogens")
            .arg("-U")
            .arg("nphs_lps"),
        ToolInvocation::new(&tools.obabel)
            .path_arg(structure)
            .arg("-opdbqt")
            .arg("-O")
            .path_arg(output)
            .arg("--partialcharge")
            .arg("gasteiger"),
        ToolInvocation::new(&tools.pythonsh).arg("-c").arg(script),
    ]
}

// Open Babel exits 0 after converting nothing; a leftover file must not pass as output.
fn remove_stale(output: &Path) -> Result<(), PipelineError> {
    if output.exists() {
        fs::remove_file(output).map_err(PipelineError::io(output))?;
    }
    Ok(())
}

fn python_quote(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
}

/// Produces a force-field-annotated PDBQT, falling through the conversion routes.
///
/// A route counts as successful only if it exits cleanly and leaves the
/// output file behind.
pub fn parameterize(
    structure: &Path,
    output: &Path,
    tools: &ToolPaths,
    runner: &dyn ToolRunner,
) -> Result<(), PipelineError> {
    remove_stale(output)?;

    let mut last_error = None;
    for invocation in parameterization_routes(structure, output, tools) {
        match run_checked(runner, &invocation) {
            Ok(_) if output.exists() => {
                debug!("'{}' produced {:?}", invocation.program, output);
                return Ok(());
            }
            Ok(_) => {
                debug!("'{}' exited cleanly without output", invocation.program);
                last_error = Some(PipelineError::MissingInput {
                    kind: "PDBQT output",
                    path: output.to_path_buf(),
                });
            }
            Err(e) => {
                debug!("Conversion route failed: {}", e);
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or(PipelineError::MissingInput {
        kind: "PDBQT output",
        path: output.to_path_buf(),
    }))
}
