//! # Engine Module
//!
//! The stateful plumbing underneath the workflows: explicit configuration
//! values (no ambient flags), the error taxonomy, progress reporting, the
//! seam through which external programs are launched, and the scratch
//! areas that keep concurrent docking jobs apart.
//!
//! - **Configuration** ([`config`]) - Builders for each workflow's settings
//! - **Error Handling** ([`error`]) - `PipelineError` and its variants
//! - **Progress Monitoring** ([`progress`]) - Callback-based event reporting
//! - **External Tools** ([`tools`]) - `ToolRunner` and the process-backed runner
//! - **Scratch Areas** ([`scratch`]) - Self-cleaning per-job directories

pub mod config;
pub mod error;
pub mod progress;
pub mod scratch;
pub mod tools;
