//! Librarby Seeder: populates a library-management API with sample data
//!
//! This crate authenticates as an administrator and runs a fixed sequence of
//! seeding stages (authors, publishers, books, editions, copies, readers,
//! librarians, rentals, reviews). Every stage feeds the identifiers it creates
//! into the next through an explicit pipeline state.

pub mod client;
pub mod config;
pub mod extract;
pub mod generate;
pub mod output;
pub mod seeder;
pub mod stages;
pub mod state;

use thiserror::Error;

/// Main error type for seeding operations
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] client::ApiError),

    #[error("Login succeeded but no token was found in response: {response}")]
    MissingToken { response: String },

    #[error("{stage}: {entity} created but id missing in response: {response}")]
    MissingIdentifier {
        stage: state::Stage,
        entity: &'static str,
        response: String,
    },

    #[error("{stage} requires state['{key}'] (run the {producer} stage first)")]
    MissingPrecondition {
        stage: state::Stage,
        key: state::StateKey,
        producer: state::Stage,
    },

    #[error("Failed to generate a unique ISBN for book {book_id} after {attempts} attempts")]
    IsbnExhausted { book_id: i64, attempts: usize },

    #[error("Failed to write credential file {path}: {source}")]
    CredentialFile {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required env var: {0}")]
    MissingVar(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for seeding operations
pub type Result<T> = std::result::Result<T, SeedError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{ApiClient, ApiError, ApiResponse};
pub use config::Config;
pub use seeder::Seeder;
pub use state::{PipelineState, Stage, StateKey};
