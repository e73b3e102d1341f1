//! # Workflows Module
//!
//! Top-level entry points, one per pipeline stage. Stages talk to each other
//! only through files on disk, so each can be run on its own.
//!
//! - **Preparation** ([`prepare`]) - SMILES list to positioned PDBQT ligands
//! - **Repositioning** ([`reposition`]) - Moves a ligand's centroid onto a target point
//! - **Docking** ([`dock`]) - Grid generation and search per ligand on a bounded worker pool
//! - **Extraction** ([`extract`]) - Best pose per docking log, with the energy cutoff applied
//! - **Reports** ([`report`]) - Docking and extraction summary tables
//!
//! A failure for one ligand is recorded and the batch goes on; only missing
//! global inputs end a workflow with an error.

pub mod dock;
pub mod extract;
pub mod prepare;
pub mod report;
pub mod reposition;
