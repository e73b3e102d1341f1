use crate::core::io::dlg::parse_docking_log;
use crate::core::models::pose::BindingStatus;
use crate::engine::error::PipelineError;
use crate::workflows::extract::{ExtractionRecord, select_best};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DOCKING_SUMMARY_FILE: &str = "docking_summary.txt";
pub const EXTRACTION_SUMMARY_FILE: &str = "extraction_summary.txt";

const MISSING: &str = "-";

/// One line of the docking summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DockingSummaryRow {
    pub ligand: String,
    pub best_energy: Option<f64>,
    pub run: Option<u32>,
    pub cluster_size: Option<u32>,
    /// Number of clusters reported; `None` when there is no usable log.
    pub cluster_count: Option<usize>,
    pub status: BindingStatus,
}

impl DockingSummaryRow {
    fn failed(ligand: &str) -> Self {
        Self {
            ligand: ligand.to_string(),
            best_energy: None,
            run: None,
            cluster_size: None,
            cluster_count: None,
            status: BindingStatus::Failed,
        }
    }
}

pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn energy(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |e| format!("{:.2}", e))
}

/// Every `*.dlg` file in `dir`, sorted by file name.
pub fn list_logs(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut logs = Vec::new();
    for entry in fs::read_dir(dir).map_err(PipelineError::io(dir))? {
        let path = entry.map_err(PipelineError::io(dir))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "dlg") {
            logs.push(path);
        }
    }
    logs.sort();
    Ok(logs)
}

/// Ligand identifier of a log: its file stem.
pub fn ligand_id(log: &Path) -> String {
    log.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn summarize_log(path: &Path, threshold: f64) -> DockingSummaryRow {
    let ligand = ligand_id(path);
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Cannot read docking log {:?}: {}", path, e);
            return DockingSummaryRow::failed(&ligand);
        }
    };
    let log = parse_docking_log(&String::from_utf8_lossy(&bytes));
    if log.is_empty() {
        warn!("{:?} matches no known docking-log block; listing it as failed", path);
        return DockingSummaryRow::failed(&ligand);
    }
    let Some(best) = select_best(&log) else {
        debug!("No binding energies in {:?}", path);
        return DockingSummaryRow::failed(&ligand);
    };
    DockingSummaryRow {
        ligand,
        best_energy: Some(best.energy),
        run: Some(best.run),
        cluster_size: best.cluster_size,
        cluster_count: log.clustering.as_ref().map(|section| section.entries.len()),
        status: BindingStatus::classify(Some(best.energy), threshold),
    }
}

/// Builds one row per log in `results_dir`, plus a failed row for every
/// expected ligand that has no log. Rows are sorted by ligand.
pub fn summarize_results(
    results_dir: &Path,
    expected: &[String],
    threshold: f64,
) -> Result<Vec<DockingSummaryRow>, PipelineError> {
    let mut rows = BTreeMap::new();
    for log in list_logs(results_dir)? {
        let row = summarize_log(&log, threshold);
        rows.insert(row.ligand.clone(), row);
    }
    for ligand in expected {
        rows.entry(ligand.clone())
            .or_insert_with(|| DockingSummaryRow::failed(ligand));
    }
    Ok(rows.into_values().collect())
}

fn table_writer<W: Write>(
    title: &str,
    generated_at: &str,
    mut writer: W,
) -> Result<csv::Writer<W>, PipelineError> {
    writeln!(writer, "# {} generated {}", title, generated_at).map_err(csv::Error::from)?;
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer))
}

pub fn write_docking_summary<W: Write>(
    rows: &[DockingSummaryRow],
    generated_at: &str,
    writer: W,
) -> Result<(), PipelineError> {
    let mut table = table_writer("Docking summary", generated_at, writer)?;
    table.write_record([
        "ligand",
        "best_energy",
        "run",
        "cluster_size",
        "cluster_count",
        "status",
    ])?;
    for row in rows {
        table.write_record([
            row.ligand.clone(),
            energy(row.best_energy),
            opt(row.run),
            opt(row.cluster_size),
            opt(row.cluster_count),
            row.status.label().to_string(),
        ])?;
    }
    table.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_extraction_summary<W: Write>(
    records: &[ExtractionRecord],
    generated_at: &str,
    writer: W,
) -> Result<(), PipelineError> {
    let mut sorted: Vec<_> = records.iter().collect();
    sorted.sort_by(|a, b| a.ligand.cmp(&b.ligand));

    let mut table = table_writer("Extraction summary", generated_at, writer)?;
    table.write_record([
        "ligand",
        "status",
        "energy",
        "run",
        "cluster_size",
        "classification",
        "output",
    ])?;
    for record in sorted {
        table.write_record([
            record.ligand.clone(),
            record.status.label().to_string(),
            energy(record.energy),
            opt(record.run),
            opt(record.cluster_size),
            opt(record.class),
            opt(record.output.as_ref().map(|p| p.display())),
        ])?;
    }
    table.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Rebuilds `<results_dir>/docking_summary.txt` from the logs on disk.
pub fn regenerate_docking_summary(
    results_dir: &Path,
    expected: &[String],
    threshold: f64,
    generated_at: &str,
) -> Result<PathBuf, PipelineError> {
    PipelineError::require("results directory", results_dir)?;
    let rows = summarize_results(results_dir, expected, threshold)?;
    let path = results_dir.join(DOCKING_SUMMARY_FILE);
    let file = File::create(&path).map_err(PipelineError::io(&path))?;
    write_docking_summary(&rows, generated_at, BufWriter::new(file))?;
    info!("Docking summary with {} row(s) written to {:?}", rows.len(), path);
    Ok(path)
}
