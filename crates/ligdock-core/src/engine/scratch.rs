use super::error::PipelineError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// A uniquely named working directory for one docking job.
///
/// The directory and everything in it is removed when the area is dropped,
/// whether the job succeeded or not.
#[derive(Debug)]
pub struct ScratchArea {
    dir: TempDir,
}

impl ScratchArea {
    pub fn create(root: Option<&Path>, label: &str) -> Result<Self, PipelineError> {
        let prefix = format!("dock_{}_", sanitize(label));
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root).map_err(PipelineError::io(root))?;
                builder.tempdir_in(root).map_err(PipelineError::io(root))?
            }
            None => builder
                .tempdir()
                .map_err(PipelineError::io(&std::env::temp_dir()))?,
        };
        debug!("Created scratch area {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Copies `source` into the area under its own file name.
    pub fn stage(&self, source: &Path) -> Result<PathBuf, PipelineError> {
        let name = source.file_name().ok_or_else(|| PipelineError::MissingInput {
            kind: "file name",
            path: source.to_path_buf(),
        })?;
        self.stage_as(source, &name.to_string_lossy())
    }

    /// Copies `source` into the area as `name`.
    pub fn stage_as(&self, source: &Path, name: &str) -> Result<PathBuf, PipelineError> {
        let dest = self.dir.path().join(name);
        fs::copy(source, &dest).map_err(PipelineError::io(source))?;
        Ok(dest)
    }

    /// Removes the directory now, logging rather than failing on cleanup errors.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove scratch area {:?}: {}", path, e);
        }
    }
}

fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
