use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileToolsConfig {
    pub obabel: Option<String>,
    pub prepare_ligand: Option<String>,
    pub pythonsh: Option<String>,
    pub autogrid: Option<String>,
    pub autodock: Option<String>,
    pub mgltools_site_packages: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePreparationConfig {
    pub output_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileDockingConfig {
    pub results_dir: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub reuse_maps: Option<bool>,
    pub run_analysis: Option<bool>,
    pub favorable_threshold: Option<f64>,
    pub staged_ligand_name: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileExtractionConfig {
    pub output_dir: Option<PathBuf>,
    pub energy_cutoff: Option<f64>,
    pub min_cluster_size: Option<u32>,
    pub keep_weak: Option<bool>,
}

/// Every setting a config file may carry; all optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub tools: Option<FileToolsConfig>,
    pub preparation: Option<FilePreparationConfig>,
    pub docking: Option<FileDockingConfig>,
    pub extraction: Option<FileExtractionConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
