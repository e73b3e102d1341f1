//! Parser for AutoDock4 docking logs (`.dlg`).
//!
//! The log is treated as a small grammar of three block kinds:
//!
//! - **Run blocks**: lines prefixed with `DOCKED: ` running from `MODEL` to
//!   `ENDMDL`, carrying `USER    Run = n` and the estimated free energy of
//!   binding for one genetic-algorithm run.
//! - **Cluster table**: the rows of the `CLUSTERING HISTOGRAM` table,
//!   `rank | lowest energy | run | mean energy | members | histogram`.
//! - **Cluster representatives**: unprefixed `MODEL`/`ENDMDL` blocks that
//!   follow the `LOWEST ENERGY DOCKED CONFORMATION from EACH CLUSTER` marker.
//!
//! Anything else is ignored. Parsing never fails; a log that yields neither
//! run records nor cluster rows is reported as such by [`DockingLog::is_empty`].

use crate::core::io::pdbqt::is_atom_record;

const DOCKED_PREFIX: &str = "DOCKED:";
const HISTOGRAM_MARKER: &str = "CLUSTERING HISTOGRAM";
const RMSD_TABLE_MARKER: &str = "RMSD TABLE";
const REPRESENTATIVES_MARKER: &str = "LOWEST ENERGY DOCKED CONFORMATION FROM EACH CLUSTER";
const ENERGY_KEY: &str = "Estimated Free Energy of Binding";
const RUN_KEY: &str = "Run";
const CLUSTER_RANK_KEY: &str = "Cluster Rank";
const CLUSTER_SIZE_KEY: &str = "Number of conformations in this cluster";

/// One `MODEL`…`ENDMDL` block with whatever metadata its `USER` lines carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseBlock {
    pub model: Option<u32>,
    pub run: Option<u32>,
    pub energy: Option<f64>,
    pub cluster_rank: Option<u32>,
    pub cluster_size: Option<u32>,
    /// Atom lines with any `DOCKED: ` tagging removed.
    pub atom_lines: Vec<String>,
    terminated: bool,
}

impl PoseBlock {
    /// The run index, falling back to the `MODEL` number.
    pub fn run_index(&self) -> Option<u32> {
        self.run.or(self.model)
    }

    pub fn has_atoms(&self) -> bool {
        !self.atom_lines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunRecord {
    pub run: u32,
    pub energy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterEntry {
    pub rank: u32,
    pub lowest_energy: f64,
    pub run: u32,
    pub mean_energy: f64,
    pub size: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSection {
    /// Table rows in the order the docking program printed them (best first).
    pub entries: Vec<ClusterEntry>,
    pub representatives: Vec<PoseBlock>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DockingLog {
    pub run_blocks: Vec<PoseBlock>,
    pub clustering: Option<ClusterSection>,
}

impl DockingLog {
    /// Run records in file order, one per run block that reported an energy.
    pub fn runs(&self) -> Vec<RunRecord> {
        self.run_blocks
            .iter()
            .filter_map(|block| {
                Some(RunRecord {
                    run: block.run_index()?,
                    energy: block.energy?,
                })
            })
            .collect()
    }

    /// Cluster table rows, empty when the log has no clustering section.
    pub fn cluster_entries(&self) -> &[ClusterEntry] {
        self.clustering
            .as_ref()
            .map_or(&[], |section| section.entries.as_slice())
    }

    /// `true` when no recognized block reported a binding energy.
    pub fn is_empty(&self) -> bool {
        self.cluster_entries().is_empty() && self.runs().is_empty()
    }

    /// Every parsed block: run blocks first, then cluster representatives.
    pub fn all_blocks(&self) -> impl Iterator<Item = &PoseBlock> {
        self.run_blocks.iter().chain(
            self.clustering
                .iter()
                .flat_map(|section| section.representatives.iter()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Body,
    Histogram,
    RmsdTable,
    Representatives,
}

#[derive(Default)]
struct BlockCollector {
    current: Option<PoseBlock>,
    finished: Vec<PoseBlock>,
}

impl BlockCollector {
    fn feed(&mut self, body: &str) {
        match record_tag(body) {
            "MODEL" => {
                self.close();
                self.current = Some(PoseBlock {
                    model: body.split_whitespace().nth(1).and_then(|n| n.parse().ok()),
                    ..Default::default()
                });
            }
            "ENDMDL" => self.close(),
            "TER" => {
                if let Some(block) = self.current.as_mut() {
                    block.terminated = true;
                }
            }
            "USER" => {
                if let Some(block) = self.current.as_mut() {
                    apply_user_line(block, body);
                }
            }
            _ if is_atom_record(body) => {
                if let Some(block) = self.current.as_mut().filter(|b| !b.terminated) {
                    block.atom_lines.push(body.trim_end().to_string());
                }
            }
            _ => {}
        }
    }

    fn close(&mut self) {
        if let Some(block) = self.current.take() {
            self.finished.push(block);
        }
    }

    fn finish(mut self) -> Vec<PoseBlock> {
        self.close();
        self.finished
    }
}

fn record_tag(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

fn apply_user_line(block: &mut PoseBlock, body: &str) {
    let Some(rest) = body.trim_start().strip_prefix("USER") else {
        return;
    };
    let Some((key, value)) = rest.split_once('=') else {
        return;
    };
    let key = key.trim();
    let first = value.split_whitespace().next().unwrap_or("");

    if key.starts_with(ENERGY_KEY) {
        block.energy = first.parse().ok();
    } else if key == RUN_KEY {
        block.run = first.parse().ok();
    } else if key == CLUSTER_RANK_KEY {
        block.cluster_rank = first.parse().ok();
    } else if key == CLUSTER_SIZE_KEY {
        block.cluster_size = first.parse().ok();
    }
}

/// Parses one `rank | lowest | run | mean | members | histogram` row.
pub fn parse_cluster_row(line: &str) -> Option<ClusterEntry> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() < 5 {
        return None;
    }
    Some(ClusterEntry {
        rank: fields[0].parse().ok()?,
        lowest_energy: fields[1].parse().ok()?,
        run: fields[2].parse().ok()?,
        mean_energy: fields[3].parse().ok()?,
        size: fields[4].parse().ok()?,
    })
}

/// Parses the full text of a docking log.
pub fn parse_docking_log(text: &str) -> DockingLog {
    let mut runs = BlockCollector::default();
    let mut representatives = BlockCollector::default();
    let mut entries = Vec::new();
    let mut has_clustering = false;
    let mut section = Section::Body;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(DOCKED_PREFIX) {
            runs.feed(rest.strip_prefix(' ').unwrap_or(rest));
            continue;
        }

        let upper = line.trim().to_ascii_uppercase();
        if upper.starts_with(HISTOGRAM_MARKER) {
            has_clustering = true;
            section = Section::Histogram;
            continue;
        }
        if upper.starts_with(RMSD_TABLE_MARKER) {
            section = Section::RmsdTable;
            continue;
        }
        if upper.starts_with(REPRESENTATIVES_MARKER) {
            has_clustering = true;
            section = Section::Representatives;
            continue;
        }

        match section {
            Section::Histogram => {
                if let Some(entry) = parse_cluster_row(line) {
                    entries.push(entry);
                }
            }
            Section::Representatives => representatives.feed(line),
            Section::Body | Section::RmsdTable => {}
        }
    }

    let clustering = has_clustering.then(|| ClusterSection {
        entries,
        representatives: representatives.finish(),
    });

    DockingLog {
        run_blocks: runs.finish(),
        clustering,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Formats one `DOCKED:` run block the way AutoDock4 writes it.
    pub fn docked_block(run: u32, energy: f64, x: f64) -> String {
        format!(
            "DOCKED: MODEL        {run}
DOCKED: USER    Run = {run}
DOCKED: USER    DPF = r.dpf
DOCKED: USER
DOCKED: USER    Estimated Free Energy of Binding    = {energy:>+7.2} kcal/mol  [=(1)+(2)+(3)-(4)]
DOCKED: USER    Estimated Inhibition Constant, Ki   =   12.34 uM (micromolar)  [Temperature = 298.15 K]
DOCKED: REMARK  0 active torsions:
DOCKED: ROOT
DOCKED: ATOM      1  C1  UNL d   1    {x:>8.3}   2.000   3.000 -0.20 +0.00    +0.123 C
DOCKED: ATOM      2  O1  UNL d   1    {x:>8.3}   3.000   4.000 -0.20 +0.00    -0.456 OA
DOCKED: ENDROOT
DOCKED: TORSDOF 0
DOCKED: TER
DOCKED: ENDMDL
"
        )
    }

    pub fn histogram(rows: &[(u32, f64, u32, f64, u32)]) -> String {
        let mut text = String::from(
            "\t\tCLUSTERING HISTOGRAM
\t\t____________________

________________________________________________________________________________
     |           |     |           |     |
Clus | Lowest    | Run | Mean      | Num | Histogram
-ter | Binding   |     | Binding   | in  |
Rank | Energy    |     | Energy    | Clus|    5    10   15   20   25   30   35
_____|___________|_____|___________|_____|____:____|____:____|____:____|____:___
",
        );
        for (rank, lowest, run, mean, size) in rows {
            text.push_str(&format!(
                "{rank:>4} |{lowest:>10.2} |{run:>4} |{mean:>10.2} |{size:>4} |{}\n",
                "#".repeat(*size as usize)
            ));
        }
        text.push_str(
            "_____|___________|_____|___________|_____|______________________________________

\t\tRMSD TABLE
\t\t__________

_____________________________________________________________________
     |      |      |           |         |                 |
Rank | Sub- | Run  | Binding   | Cluster | Reference       | Grep
     | Rank |      | Energy    | RMSD    | RMSD            | Pattern
_____|______|______|___________|_________|_________________|___________
   1      1      3       -9.50      0.00     12.34           RANKING
",
        );
        text
    }

    pub fn representative(run: u32, rank: u32, size: u32, energy: f64, x: f64) -> String {
        format!(
            "MODEL        {run}
USER    Run = {run}
USER    Cluster Rank = {rank}
USER    Number of conformations in this cluster = {size}
USER
USER    RMSD from reference structure       = 12.340 A
USER
USER    Estimated Free Energy of Binding    = {energy:>+7.2} kcal/mol  [=(1)+(2)+(3)-(4)]
ATOM      1  C1  UNL d   1    {x:>8.3}   2.000   3.000 -0.20 +0.00    +0.123 C
ATOM      2  O1  UNL d   1    {x:>8.3}   3.000   4.000 -0.20 +0.00    -0.456 OA
TER
ENDMDL
"
        )
    }

    pub const REPRESENTATIVES_HEADER: &str = "
\tLOWEST ENERGY DOCKED CONFORMATION from EACH CLUSTER
\t___________________________________________________

Keeping original residue number (specified in the input PDBQ file) for outputting.

";
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn parses_run_blocks_with_prefix_stripped() {
        let text = format!("{}{}", docked_block(1, -6.2, 1.0), docked_block(2, -7.8, 2.0));
        let log = parse_docking_log(&text);

        assert_eq!(log.run_blocks.len(), 2);
        assert!(log.clustering.is_none());
        assert_eq!(
            log.runs(),
            vec![
                RunRecord { run: 1, energy: -6.2 },
                RunRecord { run: 2, energy: -7.8 }
            ]
        );
        let atoms = &log.run_blocks[1].atom_lines;
        assert_eq!(atoms.len(), 2);
        assert!(atoms[0].starts_with("ATOM      1  C1"));
        assert!(!atoms[0].contains("DOCKED"));
    }

    #[test]
    fn parses_cluster_table_rows_in_order() {
        let text = histogram(&[(1, -9.5, 3, -9.2, 10), (2, -8.1, 7, -8.0, 4)]);
        let log = parse_docking_log(&text);

        let entries = log.cluster_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            ClusterEntry {
                rank: 1,
                lowest_energy: -9.5,
                run: 3,
                mean_energy: -9.2,
                size: 10
            }
        );
        assert_eq!(entries[1].run, 7);
    }

    #[test]
    fn rmsd_table_rows_are_not_mistaken_for_clusters() {
        let text = histogram(&[(1, -9.5, 3, -9.2, 10)]);
        let log = parse_docking_log(&text);
        assert_eq!(log.cluster_entries().len(), 1);
    }

    #[test]
    fn parses_cluster_representatives() {
        let text = format!(
            "{}{}{}{}",
            histogram(&[(1, -9.5, 3, -9.2, 10), (2, -8.1, 7, -8.0, 4)]),
            REPRESENTATIVES_HEADER,
            representative(3, 1, 10, -9.5, 5.0),
            representative(7, 2, 4, -8.1, 6.0)
        );
        let log = parse_docking_log(&text);
        let reps = &log.clustering.as_ref().unwrap().representatives;

        assert_eq!(reps.len(), 2);
        assert_eq!(reps[0].run, Some(3));
        assert_eq!(reps[0].cluster_rank, Some(1));
        assert_eq!(reps[0].cluster_size, Some(10));
        assert_eq!(reps[0].energy, Some(-9.5));
        assert_eq!(reps[0].atom_lines.len(), 2);
        assert_eq!(reps[1].run, Some(7));
    }

    #[test]
    fn atoms_after_ter_are_not_collected() {
        let text = "\
DOCKED: MODEL        1
DOCKED: USER    Run = 1
DOCKED: USER    Estimated Free Energy of Binding    =  -5.00 kcal/mol
DOCKED: ATOM      1  C1  UNL d   1       1.000   2.000   3.000 -0.20 +0.00    +0.123 C
DOCKED: TER
DOCKED: ATOM      2  C2  UNL d   1       1.000   2.000   3.000 -0.20 +0.00    +0.123 C
DOCKED: ENDMDL
";
        let log = parse_docking_log(text);
        assert_eq!(log.run_blocks[0].atom_lines.len(), 1);
    }

    #[test]
    fn block_without_run_line_uses_model_number() {
        let text = "\
DOCKED: MODEL        4
DOCKED: USER    Estimated Free Energy of Binding    =  -5.50 kcal/mol
DOCKED: ENDMDL
";
        let log = parse_docking_log(text);
        assert_eq!(log.runs(), vec![RunRecord { run: 4, energy: -5.5 }]);
    }

    #[test]
    fn unterminated_block_is_closed_at_end_of_input() {
        let text = "\
DOCKED: MODEL        1
DOCKED: USER    Run = 1
DOCKED: USER    Estimated Free Energy of Binding    =  -5.00 kcal/mol
";
        let log = parse_docking_log(text);
        assert_eq!(log.runs().len(), 1);
    }

    #[test]
    fn unrecognized_log_is_empty() {
        let log = parse_docking_log("AutoDock 4.2 crashed\nno useful output\n");
        assert!(log.is_empty());
        assert!(log.run_blocks.is_empty());
    }

    #[test]
    fn cluster_row_parser_rejects_header_rows() {
        assert!(parse_cluster_row("Clus | Lowest    | Run | Mean      | Num | Histogram").is_none());
        assert!(parse_cluster_row("_____|___________|_____|___________|_____|___").is_none());
        assert!(parse_cluster_row("   1 |     -9.50 |   3 |     -9.20 |  10 |###").is_some());
    }
}
