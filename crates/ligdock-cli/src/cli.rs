use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Ligdock Developers",
    version,
    about = "ligdock - Drives an AutoDock4 docking campaign from a SMILES list to ranked best poses.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a TOML configuration file.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S docking.jobs=4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a SMILES list into PDBQT ligands centered on a target point.
    Prepare(PrepareArgs),
    /// Run grid generation and docking for every prepared ligand.
    Dock(DockArgs),
    /// Extract the best pose from every docking log.
    Extract(ExtractArgs),
    /// Rebuild the docking summary from the logs in a results directory.
    Report(ReportArgs),
}

/// Arguments for the `prepare` subcommand.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Text file with one `SMILES [name]` entry per line.
    #[arg(value_name = "SMILES_FILE")]
    pub smiles_file: PathBuf,

    /// X coordinate of the binding-site center (Å).
    #[arg(allow_negative_numbers = true)]
    pub x: f64,

    /// Y coordinate of the binding-site center (Å).
    #[arg(allow_negative_numbers = true)]
    pub y: f64,

    /// Z coordinate of the binding-site center (Å).
    #[arg(allow_negative_numbers = true)]
    pub z: f64,

    /// Directory for the pdb/, pdbqt/ and positioned/ outputs.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the `dock` subcommand.
#[derive(Args, Debug)]
pub struct DockArgs {
    /// Directory of positioned ligand PDBQT files.
    #[arg(short, long, value_name = "DIR")]
    pub ligands: PathBuf,

    /// Receptor PDBQT file.
    #[arg(short, long, value_name = "PATH")]
    pub receptor: PathBuf,

    /// AutoGrid4 grid parameter file (.gpf).
    #[arg(short, long, value_name = "PATH")]
    pub grid_params: PathBuf,

    /// AutoDock4 docking parameter file (.dpf).
    #[arg(short, long, value_name = "PATH")]
    pub dock_params: PathBuf,

    /// Number of ligands docked at the same time.
    #[arg(short, long, value_name = "NUM")]
    pub jobs: Option<usize>,

    /// Generate grid maps once and share them across all ligands.
    #[arg(long)]
    pub reuse_maps: bool,

    /// Do not write the docking summary after the run.
    #[arg(long)]
    pub skip_analysis: bool,

    /// Directory receiving one docking log per ligand.
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Parent directory for per-ligand scratch areas (system temp dir by default).
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,
}

/// Arguments for the `extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory containing the docking logs.
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Directory for best-pose files and the extraction summary.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Poses with a binding energy above this value (kcal/mol) are weak.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub cutoff: Option<f64>,

    /// Poses from clusters smaller than this are weak.
    #[arg(long, value_name = "INT")]
    pub min_cluster_size: Option<u32>,

    /// Write weak poses too, labelled "weak binding".
    #[arg(long)]
    pub keep_weak: bool,
}

/// Arguments for the `report` subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Directory containing the docking logs.
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Directory of the ligands that were docked; those without a log are listed as failed.
    #[arg(short, long, value_name = "DIR")]
    pub ligands: Option<PathBuf>,
}
