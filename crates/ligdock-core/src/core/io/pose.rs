use crate::core::models::pose::{BestPose, PoseClass};
use std::io::{self, Write};

/// Writes a best pose as a minimal PDBQT file: `REMARK` header, atom lines, `END`.
pub fn write_pose(
    pose: &BestPose,
    class: PoseClass,
    extracted_at: &str,
    writer: &mut impl Write,
) -> io::Result<()> {
    writeln!(writer, "REMARK  Ligand: {}", pose.ligand)?;
    writeln!(writer, "REMARK  Binding energy: {:.2} kcal/mol", pose.energy)?;
    writeln!(writer, "REMARK  Run: {}", pose.run)?;
    if let Some(size) = pose.cluster_size {
        writeln!(writer, "REMARK  Cluster size: {}", size)?;
    }
    writeln!(writer, "REMARK  Classification: {}", class)?;
    writeln!(writer, "REMARK  Extracted: {}", extracted_at)?;
    for line in &pose.atom_lines {
        writeln!(writer, "{}", line)?;
    }
    writeln!(writer, "END")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::pose::SelectionStrategy;

    fn pose(cluster_size: Option<u32>) -> BestPose {
        BestPose {
            ligand: "aspirin".to_string(),
            energy: -9.5,
            run: 3,
            cluster_size,
            strategy: SelectionStrategy::Cluster,
            atom_lines: vec![
                "ATOM      1  C1  UNL d   1       5.000   2.000   3.000 -0.20 +0.00    +0.123 C"
                    .to_string(),
            ],
        }
    }

    #[test]
    fn writes_header_atoms_and_end_marker() {
        let mut out = Vec::new();
        write_pose(&pose(Some(10)), PoseClass::Acceptable, "2026-01-01 00:00:00", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "REMARK  Ligand: aspirin");
        assert_eq!(lines[1], "REMARK  Binding energy: -9.50 kcal/mol");
        assert_eq!(lines[2], "REMARK  Run: 3");
        assert_eq!(lines[3], "REMARK  Cluster size: 10");
        assert_eq!(lines[4], "REMARK  Classification: acceptable");
        assert_eq!(lines[5], "REMARK  Extracted: 2026-01-01 00:00:00");
        assert!(lines[6].starts_with("ATOM"));
        assert_eq!(*lines.last().unwrap(), "END");
    }

    #[test]
    fn omits_cluster_size_when_unknown() {
        let mut out = Vec::new();
        write_pose(&pose(None), PoseClass::Weak, "now", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("Cluster size"));
        assert!(text.contains("REMARK  Classification: weak binding"));
    }
}
