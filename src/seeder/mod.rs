//! Pipeline driver
//!
//! Runs every stage in its fixed order over one [`PipelineState`](crate::state::PipelineState),
//! stopping at the first unrecovered failure.

mod coordinator;

pub use coordinator::{run_seed, Seeder};
