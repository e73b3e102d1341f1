//! # ligdock Core Library
//!
//! Automation for an AutoDock4 ligand-docking campaign: SMILES lists become
//! positioned PDBQT ligands, each ligand is docked in its own scratch area,
//! and the resulting docking logs are reduced to best poses and summary tables.
//! The chemistry itself (3-D embedding, charge assignment, grid maps, the
//! genetic-algorithm search) is done by external programs; this crate drives
//! them and owns the text formats in between.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Data models, fixed-column parsers and
//!   writers for PDBQT files, ligand lists and docking logs, and geometry.
//!
//! - **[`engine`]: The Plumbing.** Configuration builders, the error taxonomy,
//!   progress reporting, the `ToolRunner` seam for external programs, and
//!   self-cleaning scratch areas.
//!
//! - **[`workflows`]: The Public API.** One entry point per pipeline stage:
//!   prepare, dock, extract and report.

pub mod core;
pub mod engine;
pub mod workflows;
