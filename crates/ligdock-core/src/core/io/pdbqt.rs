use crate::core::io::traits::StructureFile;
use crate::core::utils::geometry;
use nalgebra::{Point3, Vector3};
use phf::{Set, phf_set};
use std::io::{self, BufRead, Write};
use thiserror::Error;

static ATOM_RECORD_TAGS: Set<&'static str> = phf_set! { "ATOM", "HETATM" };

const X_COLUMNS: (usize, usize) = (30, 38);
const Y_COLUMNS: (usize, usize) = (38, 46);
const Z_COLUMNS: (usize, usize) = (46, 54);
const COORDINATE_WIDTH: usize = 8;

#[derive(Debug, Error)]
pub enum PdbqtError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbqtParseErrorKind,
    },
    #[error("No ATOM/HETATM records found")]
    NoAtoms,
}

#[derive(Debug, Error)]
pub enum PdbqtParseErrorKind {
    #[error("Line is too short for an ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Coordinate {value:.3} does not fit the 8-column field")]
    CoordinateOverflow { value: f64 },
}

/// Returns `true` when the line's leading tag marks an atom record.
pub fn is_atom_record(line: &str) -> bool {
    let tag = line.get(0..6).unwrap_or(line).trim_end();
    ATOM_RECORD_TAGS.contains(tag)
}

/// Extracts the `(x, y, z)` triple from the fixed coordinate columns of an atom line.
pub fn parse_coordinates(line: &str, line_num: usize) -> Result<Point3<f64>, PdbqtError> {
    let field = |(start, end): (usize, usize)| -> Result<f64, PdbqtError> {
        let raw = line.get(start..end).ok_or(PdbqtError::Parse {
            line: line_num,
            kind: PdbqtParseErrorKind::LineTooShort,
        })?;
        raw.trim().parse().map_err(|_| PdbqtError::Parse {
            line: line_num,
            kind: PdbqtParseErrorKind::InvalidFloat {
                columns: format!("{}-{}", start + 1, end),
                value: raw.trim().to_string(),
            },
        })
    };
    Ok(Point3::new(field(X_COLUMNS)?, field(Y_COLUMNS)?, field(Z_COLUMNS)?))
}

fn format_coordinate(value: f64, line_num: usize) -> Result<String, PdbqtError> {
    let text = format!("{:>8.3}", value);
    if text.len() > COORDINATE_WIDTH {
        return Err(PdbqtError::Parse {
            line: line_num,
            kind: PdbqtParseErrorKind::CoordinateOverflow { value },
        });
    }
    Ok(text)
}

/// Rewrites the coordinate columns of an atom line, leaving every other byte untouched.
pub fn replace_coordinates(
    line: &str,
    position: &Point3<f64>,
    line_num: usize,
) -> Result<String, PdbqtError> {
    let (prefix, suffix) = match (line.get(..X_COLUMNS.0), line.get(Z_COLUMNS.1..)) {
        (Some(prefix), Some(suffix)) => (prefix, suffix),
        _ => {
            return Err(PdbqtError::Parse {
                line: line_num,
                kind: PdbqtParseErrorKind::LineTooShort,
            });
        }
    };
    Ok(format!(
        "{}{}{}{}{}",
        prefix,
        format_coordinate(position.x, line_num)?,
        format_coordinate(position.y, line_num)?,
        format_coordinate(position.z, line_num)?,
        suffix
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomSite {
    pub line_index: usize,
    pub position: Point3<f64>,
}

/// A structure file held as its original lines plus the parsed atom coordinates.
///
/// Only the coordinate columns of atom records are ever rewritten; every other
/// line and column is reproduced verbatim on output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbqtStructure {
    lines: Vec<String>,
    atoms: Vec<AtomSite>,
}

impl PdbqtStructure {
    pub fn from_lines(lines: Vec<String>) -> Result<Self, PdbqtError> {
        let mut atoms = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if is_atom_record(line) {
                atoms.push(AtomSite {
                    line_index: index,
                    position: parse_coordinates(line, index + 1)?,
                });
            }
        }
        Ok(Self { lines, atoms })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn atoms(&self) -> &[AtomSite] {
        &self.atoms
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn centroid(&self) -> Option<Point3<f64>> {
        geometry::centroid(self.atoms.iter().map(|site| &site.position))
    }

    /// Applies one shift to every atom. Either all lines are rewritten or none are.
    pub fn translate(&mut self, shift: &Vector3<f64>) -> Result<(), PdbqtError> {
        let mut rewritten = Vec::with_capacity(self.atoms.len());
        for site in &self.atoms {
            let moved = site.position + shift;
            let line = replace_coordinates(&self.lines[site.line_index], &moved, site.line_index + 1)?;
            rewritten.push((moved, line));
        }
        for (site, (moved, line)) in self.atoms.iter_mut().zip(rewritten) {
            site.position = moved;
            self.lines[site.line_index] = line;
        }
        Ok(())
    }

    /// Moves the atom centroid onto `target` and returns the applied shift.
    pub fn recenter(&mut self, target: &Point3<f64>) -> Result<Vector3<f64>, PdbqtError> {
        let current = self.centroid().ok_or(PdbqtError::NoAtoms)?;
        let shift = geometry::translation_between(&current, target);
        self.translate(&shift)?;
        Ok(shift)
    }
}

impl StructureFile for PdbqtStructure {
    type Error = PdbqtError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        Self::from_lines(lines)
    }

    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error> {
        for line in &self.lines {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LIGAND: &str = "\
REMARK  4 active torsions:
ROOT
ATOM      1  C1  UNL     1       1.000   2.000   3.000  0.00  0.00    +0.123 C
HETATM    2  O1  UNL     1       3.000   4.000   5.000  0.00  0.00    -0.456 OA
ENDROOT
TORSDOF 0
";

    fn parse(text: &str) -> PdbqtStructure {
        PdbqtStructure::read_from(&mut Cursor::new(text)).unwrap()
    }

    #[test]
    fn is_atom_record_recognizes_only_leading_tags() {
        assert!(is_atom_record("ATOM      1  C1"));
        assert!(is_atom_record("HETATM    2  O1"));
        assert!(!is_atom_record("REMARK ATOM"));
        assert!(!is_atom_record("ATOMIC"));
        assert!(!is_atom_record(""));
    }

    #[test]
    fn reads_atoms_and_keeps_every_line() {
        let structure = parse(LIGAND);
        assert_eq!(structure.lines().len(), 6);
        assert_eq!(structure.atom_count(), 2);
        assert_eq!(structure.atoms()[0].position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(structure.atoms()[1].line_index, 3);
    }

    #[test]
    fn centroid_is_mean_of_atom_positions() {
        let structure = parse(LIGAND);
        assert_eq!(structure.centroid().unwrap(), Point3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn recenter_moves_centroid_and_preserves_other_columns() {
        let mut structure = parse(LIGAND);
        let original = structure.clone();
        structure.recenter(&Point3::new(-10.0, 0.5, 22.25)).unwrap();

        let centroid = structure.centroid().unwrap();
        assert!((centroid - Point3::new(-10.0, 0.5, 22.25)).norm() < 1e-9);

        for (before, after) in original.lines().iter().zip(structure.lines()) {
            assert_eq!(before.len(), after.len());
            if is_atom_record(before) {
                assert_eq!(before[..30], after[..30]);
                assert_eq!(before[54..], after[54..]);
            } else {
                assert_eq!(before, after);
            }
        }
        assert_eq!(
            &structure.lines()[2][30..54],
            " -11.000  -0.500  21.250"
        );
    }

    #[test]
    fn recenter_without_atoms_fails() {
        let mut structure = parse("REMARK nothing here\nEND\n");
        assert!(matches!(
            structure.recenter(&Point3::origin()),
            Err(PdbqtError::NoAtoms)
        ));
    }

    #[test]
    fn short_atom_line_is_rejected() {
        let result = PdbqtStructure::read_from(&mut Cursor::new("ATOM      1  C1  UNL     1  1.0\n"));
        assert!(matches!(
            result,
            Err(PdbqtError::Parse {
                line: 1,
                kind: PdbqtParseErrorKind::LineTooShort
            })
        ));
    }

    #[test]
    fn malformed_coordinate_reports_columns() {
        let line = "ATOM      1  C1  UNL     1       1.000   abcde   3.000  0.00  0.00    +0.123 C \n";
        match PdbqtStructure::read_from(&mut Cursor::new(line)) {
            Err(PdbqtError::Parse {
                kind: PdbqtParseErrorKind::InvalidFloat { columns, value },
                ..
            }) => {
                assert_eq!(columns, "39-46");
                assert_eq!(value, "abcde");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn translation_overflowing_the_field_leaves_structure_untouched() {
        let mut structure = parse(LIGAND);
        let before = structure.clone();
        let result = structure.translate(&Vector3::new(0.0, 0.0, 1.0e6));
        assert!(matches!(
            result,
            Err(PdbqtError::Parse {
                kind: PdbqtParseErrorKind::CoordinateOverflow { .. },
                ..
            })
        ));
        assert_eq!(structure, before);
    }

    #[test]
    fn write_reproduces_lines_in_order() {
        let structure = parse(LIGAND);
        let mut out = Vec::new();
        structure.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), LIGAND);
    }
}
