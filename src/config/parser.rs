use crate::config::types::{
    default_api_prefix, default_timeout_secs, AdminConfig, ApiConfig, Config, SeedConfig,
};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use librarby_seeder::config::load_config;
///
/// let config = load_config(Path::new("seeder.toml")).unwrap();
/// println!("Authors to create: {}", config.seed.authors);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two seeding runs can be matched to the same file.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Builds the configuration from process environment variables
///
/// Call `dotenv` beforehand if a `.env` file should be honoured.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    load_config_from_vars(|name| std::env::var(name).ok())
}

/// Builds the configuration from an arbitrary variable lookup
///
/// Empty values count as unset.
pub fn load_config_from_vars<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let require = |name: &str| get(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()));

    let defaults = SeedConfig::default();

    let config = Config {
        api: ApiConfig {
            base_url: require("LIBRARBY_BASE_URL")?,
            api_prefix: get("LIBRARBY_API_PREFIX").unwrap_or_else(default_api_prefix),
            timeout_secs: parse_or("LIBRARBY_TIMEOUT_SECS", get("LIBRARBY_TIMEOUT_SECS"), default_timeout_secs())?,
            nested_ids: parse_bool("LIBRARBY_NESTED_IDS", get("LIBRARBY_NESTED_IDS"))?,
        },
        admin: AdminConfig {
            username: require("APP_DEV_ADMIN_USERNAME")?,
            password: require("APP_DEV_ADMIN_PASS")?,
            email: get("APP_DEV_ADMIN_EMAIL"),
            first_name: get("APP_DEV_ADMIN_FIRSTNAME"),
            last_name: get("APP_DEV_ADMIN_LASTNAME"),
        },
        seed: SeedConfig {
            authors: parse_or("SEED_AUTHORS", get("SEED_AUTHORS"), defaults.authors)?,
            publishers: parse_or("SEED_PUBLISHERS", get("SEED_PUBLISHERS"), defaults.publishers)?,
            books: parse_or("SEED_BOOKS", get("SEED_BOOKS"), defaults.books)?,
            editions_per_book: parse_or(
                "SEED_EDITIONS_PER_BOOK",
                get("SEED_EDITIONS_PER_BOOK"),
                defaults.editions_per_book,
            )?,
            copies_per_edition: parse_or(
                "SEED_COPIES_PER_EDITION",
                get("SEED_COPIES_PER_EDITION"),
                defaults.copies_per_edition,
            )?,
            readers: parse_or("SEED_READERS", get("SEED_READERS"), defaults.readers)?,
            librarians: parse_opt("SEED_LIBRARIANS", get("SEED_LIBRARIANS"))?,
            rentals: parse_or("SEED_RENTALS", get("SEED_RENTALS"), defaults.rentals)?,
            rentals_returned_pct: parse_or(
                "SEED_RENTALS_RETURNED_PCT",
                get("SEED_RENTALS_RETURNED_PCT"),
                defaults.rentals_returned_pct,
            )?,
            due_days_min: parse_or(
                "SEED_RENTAL_DUE_MIN_DAYS",
                get("SEED_RENTAL_DUE_MIN_DAYS"),
                defaults.due_days_min,
            )?,
            due_days_max: parse_or(
                "SEED_RENTAL_DUE_MAX_DAYS",
                get("SEED_RENTAL_DUE_MAX_DAYS"),
                defaults.due_days_max,
            )?,
            reviews: parse_opt("SEED_REVIEWS", get("SEED_REVIEWS"))?,
            random_seed: parse_opt("SEED_RANDOM_SEED", get("SEED_RANDOM_SEED"))?,
            credentials_path: get("SEED_USERS_CREDS_PATH").unwrap_or(defaults.credentials_path),
            username_prefix: get("SEED_USERNAME_PREFIX").unwrap_or(defaults.username_prefix),
            skip_stages: get("SEED_SKIP_STAGES")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        },
    };

    validate(&config)?;
    Ok(config)
}

fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    Ok(parse_opt(name, raw)?.unwrap_or(default))
}

fn parse_opt<T: FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            ConfigError::Validation(format!("{} has an invalid value: '{}'", name, value))
        }),
    }
}

fn parse_bool(name: &str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(ConfigError::Validation(format!(
            "{} must be a boolean, got '{}'",
            name, v
        ))),
    }
}
