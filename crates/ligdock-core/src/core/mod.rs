//! # Core Module
//!
//! Stateless building blocks shared by every workflow: the data models that
//! travel between pipeline stages, the fixed-format text boundaries for
//! structure files, ligand lists and docking logs, and the small amount of
//! geometry needed to recenter a ligand.
//!
//! - **Data Models** ([`models`]) - Ligand records and extracted best poses
//! - **File I/O** ([`io`]) - Pure text-to-record parsers and writers
//! - **Utilities** ([`utils`]) - Centroid and translation helpers

pub mod io;
pub mod models;
pub mod utils;
