//! Output module for run summaries
//!
//! This module handles:
//! - Rendering the per-key state summary printed after a run
//! - Rendering the plan shown by a dry run

mod summary;

pub use summary::{format_plan, format_summary, print_summary};
