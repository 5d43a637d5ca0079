//! State module for the seeding pipeline
//!
//! # Components
//!
//! - `PipelineState`: the explicit context every stage reads from and writes to
//! - `Stage` / `StateKey`: names of pipeline stages and of the keys they produce
//! - `CredentialLedger`: login records for seeded reader accounts

mod ledger;
mod pipeline;
mod stage;

// Re-export main types
pub use ledger::{CredentialLedger, CredentialRecord, UserRole};
pub use pipeline::{require, IdGroups, PipelineState, SummaryValue};
pub use stage::{Stage, StateKey};
