//! Provides the text-format boundaries of the pipeline.
//!
//! Every parser here is a pure function from text to records so the fragile
//! column-offset and log-grammar logic can be tested without running any
//! external program.

pub mod dlg;
pub mod ligand_list;
pub mod pdbqt;
pub mod pose;
pub mod traits;
