//! Session bootstrap: admin login and bearer token extraction

use crate::client::endpoints;
use crate::client::transport::{ApiClient, ApiResponse};
use crate::config::Config;
use crate::extract::extract_token;
use crate::SeedError;
use serde_json::json;

/// Logs in as `username` and returns the bearer token
///
/// The token may sit under any of the usual field names, either at the root
/// of the response or inside a `data` object.
pub async fn login(client: &ApiClient, username: &str, password: &str) -> Result<String, SeedError> {
    let payload = json!({ "username": username, "password": password });
    let response = client.post(endpoints::LOGIN, Some(&payload)).await?;

    token_from(&response).ok_or_else(|| SeedError::MissingToken {
        response: response.to_string(),
    })
}

/// Resolves the configured admin, logs in and returns an authenticated client
pub async fn open_session(config: &Config) -> Result<ApiClient, SeedError> {
    let anonymous = ApiClient::new(&config.api)?;

    tracing::info!("Logging in as {}", config.admin.username);
    let token = login(&anonymous, &config.admin.username, &config.admin.password).await?;
    tracing::debug!("Received bearer token ({} chars)", token.len());

    Ok(anonymous.with_token(token))
}

fn token_from(response: &ApiResponse) -> Option<String> {
    match response {
        ApiResponse::Json(value) => extract_token(value),
        // Some deployments answer with the raw JWT as text
        ApiResponse::Text(text) if looks_like_jwt(text) => Some(text.trim().to_string()),
        _ => None,
    }
}

fn looks_like_jwt(text: &str) -> bool {
    let text = text.trim();
    text.split('.').count() == 3 && !text.contains(char::is_whitespace)
}
