mod builder;
mod defaults;
mod file;

pub use builder::{
    ReportSettings, apply_set_values, build_docking_config, build_extraction_config,
    build_preparation_config, build_report_settings,
};
pub use file::FileConfig;

use crate::error::Result;
use std::path::Path;

/// Reads the optional TOML file and layers `--set` overrides on top of it.
pub fn load(config_path: Option<&Path>, set_values: &[String]) -> Result<FileConfig> {
    let file_config = match config_path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    apply_set_values(file_config, set_values)
}
