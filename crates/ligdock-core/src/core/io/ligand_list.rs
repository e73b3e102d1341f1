use std::collections::HashSet;
use std::io::{self, BufRead};
use tracing::warn;

/// One usable entry of a ligand list: a SMILES string and its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LigandEntry {
    pub id: String,
    pub smiles: String,
    /// 1-based line number in the list file.
    pub line: usize,
}

/// Reads a whitespace-separated `SMILES [name]` list.
///
/// Blank lines and lines starting with `#` are skipped. An entry without a
/// name is called `ligand_<line>`. A name seen earlier in the list gets
/// `_<line>` appended so every identifier stays unique.
pub fn read_ligand_list(reader: impl BufRead) -> io::Result<Vec<LigandEntry>> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for (index, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = trimmed.split_whitespace();
        let Some(smiles) = fields.next() else {
            continue;
        };
        let mut id = fields
            .next()
            .map(str::to_string)
            .unwrap_or_else(|| format!("ligand_{}", line_num));

        if !seen.insert(id.clone()) {
            let renamed = format!("{}_{}", id, line_num);
            warn!(
                "Duplicate ligand name '{}' on line {}; using '{}' instead.",
                id, line_num, renamed
            );
            id = renamed;
            seen.insert(id.clone());
        }

        entries.push(LigandEntry {
            id,
            smiles: smiles.to_string(),
            line: line_num,
        });
    }

    Ok(entries)
}
