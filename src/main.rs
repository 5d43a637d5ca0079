//! Librarby Seeder main entry point
//!
//! This is the command-line interface for populating a library API with sample data.

use anyhow::Context;
use clap::Parser;
use librarby_seeder::config::{load_config_from_env, load_config_with_hash, Config};
use librarby_seeder::output::{format_plan, print_summary};
use librarby_seeder::Seeder;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Librarby Seeder: sample data for a library-management API
///
/// Logs in as an administrator and creates authors, publishers, books,
/// editions, copies, readers, librarians, rentals and reviews, feeding the
/// identifiers of each stage into the next.
#[derive(Parser, Debug)]
#[command(name = "librarby-seeder")]
#[command(version = "1.0.0")]
#[command(about = "Seeds a library-management API with sample data", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "FILE", conflicts_with = "config")]
    env_file: Option<PathBuf>,

    /// Seed for the random source, overriding the configured one
    #[arg(long)]
    seed: Option<u64>,

    /// Validate config and show what would be seeded without calling the API
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(&cli)?;
    if let Some(seed) = cli.seed {
        config.seed.random_seed = Some(seed);
    }

    if cli.dry_run {
        print!("{}", format_plan(&config, &config.seed.planned_stages()));
        println!("\n✓ Configuration is valid");
        return Ok(());
    }

    tracing::info!(
        "Seeding {}{} as {}",
        config.api.base_url,
        config.api.api_prefix,
        config.admin.username
    );

    let mut seeder = Seeder::connect(config).await.context("Login failed")?;
    match seeder.run().await {
        Ok(state) => {
            print_summary(&state);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Seeding failed: {}", e);
            Err(e.into())
        }
    }
}

/// Loads configuration from the TOML file or, without one, from the environment
fn load(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
        let (config, hash) = load_config_with_hash(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
        return Ok(config);
    }

    match &cli.env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("Failed to read env file {}", path.display()))?;
        }
        None => {
            // A missing ./.env is fine; the variables may come from the shell
            if let Ok(path) = dotenv::dotenv() {
                tracing::debug!("Loaded environment from {}", path.display());
            }
        }
    }

    load_config_from_env().context("Failed to load configuration from environment")
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("librarby_seeder=info,warn"),
            1 => EnvFilter::new("librarby_seeder=debug,info"),
            2 => EnvFilter::new("librarby_seeder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
