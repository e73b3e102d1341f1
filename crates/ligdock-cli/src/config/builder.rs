use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use crate::cli::{DockArgs, ExtractArgs, PrepareArgs, ReportArgs};
use crate::error::{CliError, Result};
use ligdock::engine::config::{
    DockingConfig, DockingConfigBuilder, ExtractionConfig, ExtractionConfigBuilder,
    PreparationConfig, PreparationConfigBuilder, ToolPaths,
};
use nalgebra::Point3;
use std::path::PathBuf;
use std::str::FromStr;

/// Settings for the `report` command, which has no library config of its own.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub results_dir: PathBuf,
    pub ligands_dir: Option<PathBuf>,
    pub favorable_threshold: f64,
}

fn tool_paths(file_config: &FileConfig) -> ToolPaths {
    let mut tools = ToolPaths::default();
    if let Some(file_tools) = &file_config.tools {
        let overrides = [
            (&mut tools.obabel, &file_tools.obabel),
            (&mut tools.prepare_ligand, &file_tools.prepare_ligand),
            (&mut tools.pythonsh, &file_tools.pythonsh),
            (&mut tools.autogrid, &file_tools.autogrid),
            (&mut tools.autodock, &file_tools.autodock),
            (
                &mut tools.mgltools_site_packages,
                &file_tools.mgltools_site_packages,
            ),
        ];
        for (slot, value) in overrides {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
    }
    tools
}

pub fn build_preparation_config(
    args: &PrepareArgs,
    file_config: &FileConfig,
) -> Result<PreparationConfig> {
    let defaults = DefaultsConfig::default();
    let file_prep = file_config.preparation.clone().unwrap_or_default();

    let output_dir = args
        .output_dir
        .clone()
        .or(file_prep.output_dir)
        .unwrap_or(defaults.prepared_dir);

    PreparationConfigBuilder::new()
        .ligand_list(args.smiles_file.clone())
        .output_dir(output_dir)
        .target(Point3::new(args.x, args.y, args.z))
        .tools(tool_paths(file_config))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

pub fn build_docking_config(args: &DockArgs, file_config: &FileConfig) -> Result<DockingConfig> {
    let defaults = DefaultsConfig::default();
    let file_dock = file_config.docking.clone().unwrap_or_default();

    let results_dir = args
        .results_dir
        .clone()
        .or(file_dock.results_dir)
        .unwrap_or(defaults.results_dir);
    let scratch_root = args.scratch_dir.clone().or(file_dock.scratch_dir);
    let jobs = args.jobs.or(file_dock.jobs).unwrap_or(defaults.jobs);
    let reuse_maps = args.reuse_maps || file_dock.reuse_maps.unwrap_or(defaults.reuse_maps);
    let run_analysis = if args.skip_analysis {
        false
    } else {
        file_dock.run_analysis.unwrap_or(defaults.run_analysis)
    };
    let favorable_threshold = file_dock
        .favorable_threshold
        .unwrap_or(defaults.favorable_threshold);

    let mut builder = DockingConfigBuilder::new()
        .ligands_dir(args.ligands.clone())
        .receptor(args.receptor.clone())
        .grid_parameters(args.grid_params.clone())
        .docking_parameters(args.dock_params.clone())
        .results_dir(results_dir)
        .scratch_root(scratch_root)
        .jobs(jobs)
        .reuse_maps(reuse_maps)
        .run_analysis(run_analysis)
        .favorable_threshold(favorable_threshold)
        .tools(tool_paths(file_config));
    if let Some(name) = file_dock.staged_ligand_name {
        builder = builder.staged_ligand_name(name);
    }
    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

pub fn build_extraction_config(
    args: &ExtractArgs,
    file_config: &FileConfig,
) -> Result<ExtractionConfig> {
    let defaults = DefaultsConfig::default();
    let file_dock = file_config.docking.clone().unwrap_or_default();
    let file_extract = file_config.extraction.clone().unwrap_or_default();

    let results_dir = args
        .results_dir
        .clone()
        .or(file_dock.results_dir)
        .unwrap_or(defaults.results_dir);
    let output_dir = args
        .output_dir
        .clone()
        .or(file_extract.output_dir)
        .unwrap_or(defaults.poses_dir);
    let energy_cutoff = args
        .cutoff
        .or(file_extract.energy_cutoff)
        .unwrap_or(defaults.energy_cutoff);
    let min_cluster_size = args
        .min_cluster_size
        .or(file_extract.min_cluster_size)
        .unwrap_or(defaults.min_cluster_size);
    let keep_weak = args.keep_weak || file_extract.keep_weak.unwrap_or(defaults.keep_weak);

    ExtractionConfigBuilder::new()
        .results_dir(results_dir)
        .output_dir(output_dir)
        .energy_cutoff(energy_cutoff)
        .min_cluster_size(min_cluster_size)
        .keep_weak(keep_weak)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

pub fn build_report_settings(args: &ReportArgs, file_config: &FileConfig) -> ReportSettings {
    let defaults = DefaultsConfig::default();
    let file_dock = file_config.docking.clone().unwrap_or_default();

    ReportSettings {
        results_dir: args
            .results_dir
            .clone()
            .or(file_dock.results_dir)
            .unwrap_or(defaults.results_dir),
        ligands_dir: args.ligands.clone(),
        favorable_threshold: file_dock
            .favorable_threshold
            .unwrap_or(defaults.favorable_threshold),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

pub fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        let (section, field) = key.split_once('.').unwrap_or((key, ""));
        match section {
            "tools" => {
                let tools = config.tools.get_or_insert_with(Default::default);
                let slot = match field {
                    "obabel" => &mut tools.obabel,
                    "prepare-ligand" => &mut tools.prepare_ligand,
                    "pythonsh" => &mut tools.pythonsh,
                    "autogrid" => &mut tools.autogrid,
                    "autodock" => &mut tools.autodock,
                    "mgltools-site-packages" => &mut tools.mgltools_site_packages,
                    _ => return Err(unsupported(key)),
                };
                *slot = Some(value_str.to_string());
            }
            "preparation" => {
                let prep = config.preparation.get_or_insert_with(Default::default);
                match field {
                    "output-dir" => prep.output_dir = Some(PathBuf::from(value_str)),
                    _ => return Err(unsupported(key)),
                }
            }
            "docking" => {
                let dock = config.docking.get_or_insert_with(Default::default);
                match field {
                    "results-dir" => dock.results_dir = Some(PathBuf::from(value_str)),
                    "scratch-dir" => dock.scratch_dir = Some(PathBuf::from(value_str)),
                    "jobs" => dock.jobs = Some(parse_value(key, value_str, "integer")?),
                    "reuse-maps" => dock.reuse_maps = Some(parse_value(key, value_str, "boolean")?),
                    "run-analysis" => {
                        dock.run_analysis = Some(parse_value(key, value_str, "boolean")?)
                    }
                    "favorable-threshold" => {
                        dock.favorable_threshold = Some(parse_value(key, value_str, "float")?)
                    }
                    "staged-ligand-name" => dock.staged_ligand_name = Some(value_str.to_string()),
                    _ => return Err(unsupported(key)),
                }
            }
            "extraction" => {
                let extract = config.extraction.get_or_insert_with(Default::default);
                match field {
                    "output-dir" => extract.output_dir = Some(PathBuf::from(value_str)),
                    "energy-cutoff" => {
                        extract.energy_cutoff = Some(parse_value(key, value_str, "float")?)
                    }
                    "min-cluster-size" => {
                        extract.min_cluster_size = Some(parse_value(key, value_str, "integer")?)
                    }
                    "keep-weak" => {
                        extract.keep_weak = Some(parse_value(key, value_str, "boolean")?)
                    }
                    _ => return Err(unsupported(key)),
                }
            }
            _ => return Err(unsupported(key)),
        }
    }
    Ok(config)
}

fn unsupported(key: &str) -> CliError {
    CliError::Config(format!("Unsupported configuration key for --set: '{}'", key))
}
