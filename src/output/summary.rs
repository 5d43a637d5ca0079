use crate::config::Config;
use crate::state::{PipelineState, Stage};
use std::fmt::Write;

/// Renders the end-of-run summary
///
/// One line per written state key, in key order: collections show their
/// size, scalars their value.
pub fn format_summary(state: &PipelineState) -> String {
    let mut out = String::from("Seeding finished.\nState summary:\n");
    for (key, value) in state.summary() {
        let _ = writeln!(out, "  {}: {}", key, value);
    }
    out
}

pub fn print_summary(state: &PipelineState) {
    print!("{}", format_summary(state));
}

/// Renders what a run with `config` would do, without contacting the API
pub fn format_plan(config: &Config, stages: &[Stage]) -> String {
    let seed = &config.seed;
    let mut out = String::new();

    let _ = writeln!(out, "=== Librarby Seeder Dry Run ===\n");
    let _ = writeln!(out, "API:");
    let _ = writeln!(out, "  Base URL: {}", config.api.base_url);
    let _ = writeln!(out, "  Prefix: {}", config.api.api_prefix);
    let _ = writeln!(out, "  Timeout: {}s", config.api.timeout_secs);
    let _ = writeln!(out, "  Nested ids: {}", config.api.nested_ids);
    let _ = writeln!(out, "  Admin: {}", config.admin.username);

    let _ = writeln!(out, "\nStages ({}):", stages.len());
    for stage in stages {
        let detail = match stage {
            Stage::Authors => format!("{} authors", seed.authors),
            Stage::Publishers => format!("{} publishers", seed.effective_publishers()),
            Stage::Books => format!("{} books", seed.books),
            Stage::Editions => format!("{} per book", seed.effective_editions_per_book()),
            Stage::Copies => format!("{} per edition", seed.effective_copies_per_edition()),
            Stage::Users => format!(
                "{} readers, credentials to {}",
                seed.readers, seed.credentials_path
            ),
            Stage::Librarians => format!("{} librarians", seed.effective_librarians(seed.readers)),
            Stage::Rentals => format!(
                "{} rentals, {:.0}% returned, due in {}-{} days",
                seed.rentals, seed.rentals_returned_pct, seed.due_days_min, seed.due_days_max
            ),
            Stage::Reviews => match seed.reviews {
                Some(n) => format!("up to {} reviews", n),
                None => "one review per candidate".to_string(),
            },
        };
        let _ = writeln!(out, "  - {}: {}", stage, detail);
    }

    match seed.random_seed {
        Some(value) => {
            let _ = writeln!(out, "\nRandom seed: {}", value);
        }
        None => {
            let _ = writeln!(out, "\nRandom seed: from entropy");
        }
    }
    out
}
