use super::config::ConfigError;
use crate::core::io::pdbqt::PdbqtError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Missing {kind}: {}", path.display())]
    MissingInput { kind: &'static str, path: PathBuf },

    #[error("Failed to launch '{program}': {source}")]
    ToolLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Structure file error: {0}")]
    Structure(#[from] PdbqtError),

    #[error("No binding energies found for ligand '{ligand}'")]
    NoBindingEnergies { ligand: String },

    #[error("Could not locate coordinates for run {run} (energy {energy:.2} kcal/mol)")]
    PoseNotFound { run: u32, energy: f64 },

    #[error("Report error: {0}")]
    Report(#[from] csv::Error),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Adapter for `map_err` that attaches the offending path to an I/O error.
    pub fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Fails with `MissingInput` unless `path` exists.
    pub fn require(kind: &'static str, path: &Path) -> Result<(), Self> {
        if path.exists() {
            Ok(())
        } else {
            Err(PipelineError::MissingInput {
                kind,
                path: path.to_path_buf(),
            })
        }
    }
}
