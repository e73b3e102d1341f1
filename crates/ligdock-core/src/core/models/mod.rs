//! Data models passed between pipeline stages.

pub mod ligand;
pub mod pose;
