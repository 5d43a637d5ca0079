use crate::generate::publishers::default_publisher_count;
use crate::state::Stage;
use serde::Deserialize;

/// Main configuration structure for the seeder
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Target API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Root URL of the deployment (e.g., "http://localhost:8080")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path prefix prepended to every endpoint
    #[serde(rename = "api-prefix", default = "default_api_prefix")]
    pub api_prefix: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Also look for created identifiers under a `data` wrapper
    #[serde(rename = "nested-ids", default)]
    pub nested_ids: bool,
}

/// Administrator account used for the login call
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "first-name", default)]
    pub first_name: Option<String>,
    #[serde(rename = "last-name", default)]
    pub last_name: Option<String>,
}

/// Counts and tunables for the seeding stages
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SeedConfig {
    pub authors: usize,
    /// Zero means "use the built-in publisher vocabulary, up to ten names"
    pub publishers: usize,
    pub books: usize,
    pub editions_per_book: usize,
    pub copies_per_edition: usize,
    pub readers: usize,
    /// Unset means roughly a fifth of the readers (at least 1, at most 10)
    pub librarians: Option<usize>,
    pub rentals: usize,
    /// Percentage of new rentals returned immediately
    pub rentals_returned_pct: f64,
    pub due_days_min: u32,
    pub due_days_max: u32,
    /// Unset means one review per candidate pair
    pub reviews: Option<usize>,
    pub random_seed: Option<u64>,
    pub credentials_path: String,
    pub username_prefix: String,
    pub skip_stages: Vec<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            authors: 10,
            publishers: 10,
            books: 20,
            editions_per_book: 1,
            copies_per_edition: 2,
            readers: 10,
            librarians: None,
            rentals: 20,
            rentals_returned_pct: 25.0,
            due_days_min: 14,
            due_days_max: 30,
            reviews: None,
            random_seed: None,
            credentials_path: "seeded_users.json".to_string(),
            username_prefix: "reader".to_string(),
            skip_stages: Vec::new(),
        }
    }
}

impl SeedConfig {
    /// Publishers to create or reuse; zero falls back to the built-in default
    pub fn effective_publishers(&self) -> usize {
        match self.publishers {
            0 => default_publisher_count(),
            n => n,
        }
    }

    /// Editions to create per book; zero is treated as one
    pub fn effective_editions_per_book(&self) -> usize {
        self.editions_per_book.max(1)
    }

    /// Copies to create per edition; zero is treated as one
    pub fn effective_copies_per_edition(&self) -> usize {
        self.copies_per_edition.max(1)
    }

    /// Number of readers to promote given how many were registered
    pub fn effective_librarians(&self, readers: usize) -> usize {
        let wanted = match self.librarians {
            Some(n) if n > 0 => n,
            _ => (readers / 5).clamp(1, 10),
        };
        wanted.min(readers)
    }

    /// Stages left to run, in order, once `skip-stages` is applied
    ///
    /// Unknown names are rejected by validation and ignored here.
    pub fn planned_stages(&self) -> Vec<Stage> {
        let skipped: Vec<Stage> = self
            .skip_stages
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();

        Stage::ALL
            .into_iter()
            .filter(|stage| !skipped.contains(stage))
            .collect()
    }
}

pub(crate) fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    20
}
