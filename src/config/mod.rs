//! Configuration module for the seeder
//!
//! This module handles loading configuration either from a TOML file or from
//! environment variables, and validating the result.
//!
//! # Example
//!
//! ```no_run
//! use librarby_seeder::config::load_config_from_env;
//!
//! let config = load_config_from_env().unwrap();
//! println!("Seeding {} with {} books", config.api.base_url, config.seed.books);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AdminConfig, ApiConfig, Config, SeedConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_from_env, load_config_from_vars,
    load_config_with_hash,
};
