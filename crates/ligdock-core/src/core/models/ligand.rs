use std::path::{Path, PathBuf};

/// A ligand as it moves through the pipeline.
///
/// Created from a list entry or a prepared structure file; each stage only
/// fills in the path of the artifact it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LigandRecord {
    pub id: String,
    pub smiles: Option<String>,
    pub structure_path: Option<PathBuf>,
    pub prepared_path: Option<PathBuf>,
    pub positioned_path: Option<PathBuf>,
}

impl LigandRecord {
    pub fn from_smiles(id: impl Into<String>, smiles: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            smiles: Some(smiles.into()),
            structure_path: None,
            prepared_path: None,
            positioned_path: None,
        }
    }

    /// Wraps an already positioned structure file; the identifier is the file stem.
    pub fn from_positioned(path: &Path) -> Option<Self> {
        let id = path.file_stem()?.to_str()?.to_string();
        Some(Self {
            id,
            smiles: None,
            structure_path: None,
            prepared_path: None,
            positioned_path: Some(path.to_path_buf()),
        })
    }
}
