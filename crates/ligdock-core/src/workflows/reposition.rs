use crate::core::io::pdbqt::{PdbqtError, PdbqtStructure};
use crate::core::io::traits::StructureFile;
use crate::engine::error::PipelineError;
use nalgebra::{Point3, Vector3};
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

fn with_path(path: &Path) -> impl FnOnce(PdbqtError) -> PipelineError + '_ {
    move |e| match e {
        PdbqtError::Io(source) => PipelineError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => PipelineError::Structure(other),
    }
}

/// Translates every atom of `input` so the centroid lands on `target`, writing to `output`.
///
/// Non-coordinate content and line order are preserved. A file without atom
/// records fails before `output` is touched; a failed write removes the
/// partial output.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn reposition_ligand(
    input: &Path,
    target: &Point3<f64>,
    output: &Path,
) -> Result<Vector3<f64>, PipelineError> {
    let mut structure = PdbqtStructure::read_from_path(input).map_err(with_path(input))?;
    let shift = structure.recenter(target)?;
    debug!(
        "Shifting {} atoms by ({:.3}, {:.3}, {:.3})",
        structure.atom_count(),
        shift.x,
        shift.y,
        shift.z
    );

    if let Err(e) = structure.write_to_path(output) {
        let _ = fs::remove_file(output);
        return Err(with_path(output)(e));
    }
    Ok(shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::geometry::centroid;
    use tempfile::tempdir;

    const LIGAND: &str = "\
REMARK  2 active torsions:
ROOT
HETATM    1  C1  UNL     1      -1.234   5.678  10.000  0.00  0.00    +0.123 C
HETATM    2  C2  UNL     1       0.766   7.678  12.500  0.00  0.00    +0.050 C
ENDROOT
BRANCH   2   3
HETATM    3  O1  UNL     1       2.111   4.000   9.999  0.00  0.00    -0.456 OA
ENDBRANCH   2   3
TORSDOF 1
";

    #[test]
    fn output_centroid_matches_target_and_counts_are_preserved() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.pdbqt");
        let output = dir.path().join("out.pdbqt");
        fs::write(&input, LIGAND).unwrap();

        let target = Point3::new(12.5, -3.25, 40.0);
        reposition_ligand(&input, &target, &output).unwrap();

        let result = PdbqtStructure::read_from_path(&output).unwrap();
        assert_eq!(result.atom_count(), 3);
        assert_eq!(result.lines().len(), LIGAND.lines().count());

        let positions: Vec<_> = result.atoms().iter().map(|a| a.position).collect();
        let c = centroid(&positions).unwrap();
        assert!((c.x - target.x).abs() < 1e-3);
        assert!((c.y - target.y).abs() < 1e-3);
        assert!((c.z - target.z).abs() < 1e-3);

        let written = fs::read_to_string(&output).unwrap();
        for (before, after) in LIGAND.lines().zip(written.lines()) {
            if before.starts_with("HETATM") {
                assert_eq!(before[..30], after[..30]);
                assert_eq!(before[54..], after[54..]);
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn file_without_atoms_fails_and_leaves_output_alone() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.pdbqt");
        let output = dir.path().join("out.pdbqt");
        fs::write(&input, "REMARK no atoms\nTORSDOF 0\n").unwrap();
        fs::write(&output, "previous content\n").unwrap();

        let result = reposition_ligand(&input, &Point3::origin(), &output);
        assert!(matches!(
            result,
            Err(PipelineError::Structure(PdbqtError::NoAtoms))
        ));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous content\n");
    }

    #[test]
    fn file_without_atoms_does_not_create_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.pdbqt");
        let output = dir.path().join("out.pdbqt");
        fs::write(&input, "").unwrap();

        assert!(reposition_ligand(&input, &Point3::origin(), &output).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn missing_input_is_an_io_error_naming_the_path() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("absent.pdbqt");
        match reposition_ligand(&input, &Point3::origin(), &dir.path().join("out.pdbqt")) {
            Err(PipelineError::Io { path, .. }) => assert_eq!(path, input),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
