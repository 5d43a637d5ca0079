//! Seeder coordinator - main seeding orchestration logic
//!
//! This module owns everything a run needs besides the state itself:
//! - The authenticated API client
//! - The resolved configuration
//! - The random source shared by every generator
//! - The calendar date due dates and birth dates are computed from

use crate::client::{open_session, ApiClient};
use crate::config::Config;
use crate::extract::IdScope;
use crate::generate::{seeded_rng, SeedRng};
use crate::stages::{self, StageContext};
use crate::state::{PipelineState, Stage};
use crate::SeedError;
use chrono::NaiveDate;
use std::time::Instant;

/// Drives the stages over one pipeline state
pub struct Seeder {
    config: Config,
    client: ApiClient,
    rng: SeedRng,
    today: NaiveDate,
}

impl Seeder {
    /// Logs in as the configured admin and prepares a run
    ///
    /// The random source is seeded from `seed.random-seed` when set.
    pub async fn connect(config: Config) -> Result<Self, SeedError> {
        let client = open_session(&config).await?;
        let rng = seeded_rng(config.seed.random_seed);
        Ok(Self::with_client(config, client, rng))
    }

    /// Prepares a run with an existing client and random source
    pub fn with_client(config: Config, client: ApiClient, rng: SeedRng) -> Self {
        Self {
            config,
            client,
            rng,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Overrides the date used as "today"
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stages that will run, in order, after `skip-stages` is applied
    pub fn planned_stages(&self) -> Vec<Stage> {
        self.config.seed.planned_stages()
    }

    /// Runs every planned stage over a fresh state
    pub async fn run(&mut self) -> Result<PipelineState, SeedError> {
        let mut state = PipelineState::new();
        self.run_with(&mut state).await?;
        Ok(state)
    }

    /// Runs every planned stage over `state`
    ///
    /// On failure `state` keeps whatever the stages wrote before the error.
    pub async fn run_with(&mut self, state: &mut PipelineState) -> Result<(), SeedError> {
        let planned = self.planned_stages();

        for stage in Stage::ALL {
            if !planned.contains(&stage) {
                tracing::info!("Skipping stage {}", stage);
                continue;
            }
            self.run_stage(stage, state).await?;
        }

        Ok(())
    }

    /// Runs one stage and commits its results to `state`
    pub async fn run_stage(&mut self, stage: Stage, state: &mut PipelineState) -> Result<(), SeedError> {
        let ctx = StageContext::new(
            &self.client,
            &self.config.seed,
            IdScope::from_nested(self.config.api.nested_ids),
            self.today,
        );
        let rng = &mut self.rng;

        tracing::info!("Running stage {}", stage);
        let started = Instant::now();

        let outcome = match stage {
            Stage::Authors => stages::authors::seed(&ctx, state, rng).await,
            Stage::Publishers => stages::publishers::seed(&ctx, state, rng).await,
            Stage::Books => stages::books::seed(&ctx, state, rng).await,
            Stage::Editions => stages::editions::seed(&ctx, state, rng).await,
            Stage::Copies => stages::copies::seed(&ctx, state).await,
            Stage::Users => stages::users::seed(&ctx, state, rng).await,
            Stage::Librarians => stages::librarians::seed(&ctx, state, rng).await,
            Stage::Rentals => stages::rentals::seed(&ctx, state, rng).await,
            Stage::Reviews => stages::reviews::seed(&ctx, state, rng).await,
        };

        if let Err(e) = outcome {
            tracing::error!("Stage {} failed: {}", stage, e);
            return Err(e);
        }

        state.commit(stage);
        tracing::debug!(
            "Stage {} finished in {:.2?} (state version {})",
            stage,
            started.elapsed(),
            state.version()
        );
        Ok(())
    }
}

/// Runs a complete seeding operation
///
/// This is the main entry point for a run. It will:
/// 1. Log in as the configured admin
/// 2. Run every stage not listed in `skip-stages`
/// 3. Return the final pipeline state
pub async fn run_seed(config: Config) -> Result<PipelineState, SeedError> {
    let mut seeder = Seeder::connect(config).await?;
    seeder.run().await
}
