use ligdock::engine::config::{
    DEFAULT_ENERGY_CUTOFF, DEFAULT_FAVORABLE_THRESHOLD, DEFAULT_MIN_CLUSTER_SIZE,
};
use std::path::PathBuf;

pub struct DefaultsConfig {
    pub prepared_dir: PathBuf,
    pub results_dir: PathBuf,
    pub poses_dir: PathBuf,
    pub jobs: usize,
    pub reuse_maps: bool,
    pub run_analysis: bool,
    pub favorable_threshold: f64,
    pub energy_cutoff: f64,
    pub min_cluster_size: u32,
    pub keep_weak: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            prepared_dir: PathBuf::from("prepared_ligands"),
            results_dir: PathBuf::from("results"),
            poses_dir: PathBuf::from("best_poses"),
            jobs: 1,
            reuse_maps: false,
            run_analysis: true,
            favorable_threshold: DEFAULT_FAVORABLE_THRESHOLD,
            energy_cutoff: DEFAULT_ENERGY_CUTOFF,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            keep_weak: false,
        }
    }
}
