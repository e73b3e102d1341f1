use nalgebra::Point3;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_ENERGY_CUTOFF: f64 = -5.0;
pub const DEFAULT_FAVORABLE_THRESHOLD: f64 = -6.0;
pub const DEFAULT_MIN_CLUSTER_SIZE: u32 = 1;
pub const DEFAULT_STAGED_LIGAND_NAME: &str = "l.pdbqt";
pub const DEFAULT_MGLTOOLS_SITE_PACKAGES: &str = "/usr/local/lib/python2.7/site-packages/";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {parameter}: {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Program names (or paths) of the external tools the pipeline drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub obabel: String,
    pub prepare_ligand: String,
    pub pythonsh: String,
    pub autogrid: String,
    pub autodock: String,
    /// Appended to `sys.path` so `pythonsh` can import AutoDockTools.
    pub mgltools_site_packages: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            obabel: "obabel".to_string(),
            prepare_ligand: "prepare_ligand4.py".to_string(),
            pythonsh: "pythonsh".to_string(),
            autogrid: "autogrid4".to_string(),
            autodock: "autodock4".to_string(),
            mgltools_site_packages: DEFAULT_MGLTOOLS_SITE_PACKAGES.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparationConfig {
    pub ligand_list: PathBuf,
    pub output_dir: PathBuf,
    pub target: Point3<f64>,
    pub tools: ToolPaths,
}

#[derive(Default)]
pub struct PreparationConfigBuilder {
    ligand_list: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    target: Option<Point3<f64>>,
    tools: Option<ToolPaths>,
}

impl PreparationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ligand_list(mut self, path: PathBuf) -> Self {
        self.ligand_list = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn target(mut self, target: Point3<f64>) -> Self {
        self.target = Some(target);
        self
    }
    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn build(self) -> Result<PreparationConfig, ConfigError> {
        let target = self.target.ok_or(ConfigError::MissingParameter("target"))?;
        if !target.coords.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::InvalidValue {
                parameter: "target",
                reason: "coordinates must be finite".to_string(),
            });
        }
        Ok(PreparationConfig {
            ligand_list: self
                .ligand_list
                .ok_or(ConfigError::MissingParameter("ligand_list"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            target,
            tools: self.tools.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DockingConfig {
    pub ligands_dir: PathBuf,
    pub receptor: PathBuf,
    pub grid_parameters: PathBuf,
    pub docking_parameters: PathBuf,
    pub results_dir: PathBuf,
    /// Parent of the per-ligand scratch directories; the system temp dir when `None`.
    pub scratch_root: Option<PathBuf>,
    /// File name the ligand is staged under; the parameter files refer to it.
    pub staged_ligand_name: String,
    pub jobs: usize,
    pub reuse_maps: bool,
    pub run_analysis: bool,
    pub favorable_threshold: f64,
    pub tools: ToolPaths,
}

#[derive(Default)]
pub struct DockingConfigBuilder {
    ligands_dir: Option<PathBuf>,
    receptor: Option<PathBuf>,
    grid_parameters: Option<PathBuf>,
    docking_parameters: Option<PathBuf>,
    results_dir: Option<PathBuf>,
    scratch_root: Option<PathBuf>,
    staged_ligand_name: Option<String>,
    jobs: Option<usize>,
    reuse_maps: Option<bool>,
    run_analysis: Option<bool>,
    favorable_threshold: Option<f64>,
    tools: Option<ToolPaths>,
}

impl DockingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ligands_dir(mut self, path: PathBuf) -> Self {
        self.ligands_dir = Some(path);
        self
    }
    pub fn receptor(mut self, path: PathBuf) -> Self {
        self.receptor = Some(path);
        self
    }
    pub fn grid_parameters(mut self, path: PathBuf) -> Self {
        self.grid_parameters = Some(path);
        self
    }
    pub fn docking_parameters(mut self, path: PathBuf) -> Self {
        self.docking_parameters = Some(path);
        self
    }
    pub fn results_dir(mut self, path: PathBuf) -> Self {
        self.results_dir = Some(path);
        self
    }
    pub fn scratch_root(mut self, path: Option<PathBuf>) -> Self {
        self.scratch_root = path;
        self
    }
    pub fn staged_ligand_name(mut self, name: String) -> Self {
        self.staged_ligand_name = Some(name);
        self
    }
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }
    pub fn reuse_maps(mut self, reuse: bool) -> Self {
        self.reuse_maps = Some(reuse);
        self
    }
    pub fn run_analysis(mut self, run: bool) -> Self {
        self.run_analysis = Some(run);
        self
    }
    pub fn favorable_threshold(mut self, threshold: f64) -> Self {
        self.favorable_threshold = Some(threshold);
        self
    }
    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn build(self) -> Result<DockingConfig, ConfigError> {
        let jobs = self.jobs.unwrap_or(1);
        if jobs == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "jobs",
                reason: "at least one job slot is required".to_string(),
            });
        }
        let staged_ligand_name = self
            .staged_ligand_name
            .unwrap_or_else(|| DEFAULT_STAGED_LIGAND_NAME.to_string());
        if staged_ligand_name.is_empty() || staged_ligand_name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                parameter: "staged_ligand_name",
                reason: format!("'{}' is not a plain file name", staged_ligand_name),
            });
        }
        Ok(DockingConfig {
            ligands_dir: self
                .ligands_dir
                .ok_or(ConfigError::MissingParameter("ligands_dir"))?,
            receptor: self
                .receptor
                .ok_or(ConfigError::MissingParameter("receptor"))?,
            grid_parameters: self
                .grid_parameters
                .ok_or(ConfigError::MissingParameter("grid_parameters"))?,
            docking_parameters: self
                .docking_parameters
                .ok_or(ConfigError::MissingParameter("docking_parameters"))?,
            results_dir: self
                .results_dir
                .ok_or(ConfigError::MissingParameter("results_dir"))?,
            scratch_root: self.scratch_root,
            staged_ligand_name,
            jobs,
            reuse_maps: self.reuse_maps.unwrap_or(false),
            run_analysis: self.run_analysis.unwrap_or(true),
            favorable_threshold: self
                .favorable_threshold
                .unwrap_or(DEFAULT_FAVORABLE_THRESHOLD),
            tools: self.tools.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub results_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Poses above this energy (kcal/mol) are classified as weak.
    pub energy_cutoff: f64,
    /// Poses from smaller clusters are classified as weak when the size is known.
    pub min_cluster_size: u32,
    /// Still write weak poses, labeled as such, instead of discarding them.
    pub keep_weak: bool,
}

#[derive(Default)]
pub struct ExtractionConfigBuilder {
    results_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    energy_cutoff: Option<f64>,
    min_cluster_size: Option<u32>,
    keep_weak: Option<bool>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results_dir(mut self, path: PathBuf) -> Self {
        self.results_dir = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn energy_cutoff(mut self, cutoff: f64) -> Self {
        self.energy_cutoff = Some(cutoff);
        self
    }
    pub fn min_cluster_size(mut self, size: u32) -> Self {
        self.min_cluster_size = Some(size);
        self
    }
    pub fn keep_weak(mut self, keep: bool) -> Self {
        self.keep_weak = Some(keep);
        self
    }

    pub fn build(self) -> Result<ExtractionConfig, ConfigError> {
        let energy_cutoff = self.energy_cutoff.unwrap_or(DEFAULT_ENERGY_CUTOFF);
        if !energy_cutoff.is_finite() {
            return Err(ConfigError::InvalidValue {
                parameter: "energy_cutoff",
                reason: "must be a finite number".to_string(),
            });
        }
        Ok(ExtractionConfig {
            results_dir: self
                .results_dir
                .ok_or(ConfigError::MissingParameter("results_dir"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            energy_cutoff,
            min_cluster_size: self.min_cluster_size.unwrap_or(DEFAULT_MIN_CLUSTER_SIZE),
            keep_weak: self.keep_weak.unwrap_or(false),
        })
    }
}
