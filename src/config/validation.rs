use crate::config::types::{AdminConfig, ApiConfig, Config, SeedConfig};
use crate::state::Stage;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_admin_config(&config.admin)?;
    validate_seed_config(&config.seed)?;
    Ok(())
}

/// Validates the target API settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            config.base_url
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates the administrator credentials
fn validate_admin_config(config: &AdminConfig) -> Result<(), ConfigError> {
    if config.username.trim().is_empty() {
        return Err(ConfigError::Validation(
            "admin username cannot be empty".to_string(),
        ));
    }

    if config.password.is_empty() {
        return Err(ConfigError::Validation(
            "admin password cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates stage counts and tunables
fn validate_seed_config(config: &SeedConfig) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&config.rentals_returned_pct) {
        return Err(ConfigError::Validation(format!(
            "rentals_returned_pct must be between 0 and 100, got {}",
            config.rentals_returned_pct
        )));
    }

    if config.due_days_min < 1 {
        return Err(ConfigError::Validation(format!(
            "due_days_min must be >= 1 (due dates must lie in the future), got {}",
            config.due_days_min
        )));
    }

    if config.due_days_min > config.due_days_max {
        return Err(ConfigError::Validation(format!(
            "due_days_min ({}) cannot exceed due_days_max ({})",
            config.due_days_min, config.due_days_max
        )));
    }

    if config.credentials_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "credentials_path cannot be empty".to_string(),
        ));
    }

    validate_username_prefix(&config.username_prefix)?;

    for name in &config.skip_stages {
        if name.parse::<Stage>().is_err() {
            return Err(ConfigError::Validation(format!(
                "skip_stages contains unknown stage '{}'",
                name
            )));
        }
    }

    Ok(())
}

/// Usernames are `<prefix>_<nnn>` and the API accepts 3 to 50 characters
fn validate_username_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.len() < 3 || prefix.len() > 40 {
        return Err(ConfigError::Validation(format!(
            "username_prefix must be 3 to 40 characters, got '{}'",
            prefix
        )));
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::Validation(format!(
            "username_prefix must contain only letters, digits and underscores, got '{}'",
            prefix
        )));
    }

    Ok(())
}
