//! HTTP transport for the library API
//!
//! This module handles all HTTP requests for the seeder, including:
//! - Building the HTTP client with timeout and user agent
//! - Joining endpoint paths onto the configured base URL and prefix
//! - Attaching the bearer token once a session exists
//! - Turning bodies into JSON, text or nothing
//! - Translating non-2xx statuses into structured errors

use crate::config::ApiConfig;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Parsed body of a successful response
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// JSON body
    Json(Value),
    /// Non-JSON body
    Text(String),
    /// 204 or empty body
    Empty,
}

impl ApiResponse {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            _ => None,
        }
    }

    /// JSON body, or `Value::Null` for text and empty responses
    pub fn json_or_null(&self) -> &Value {
        static NULL: Value = Value::Null;
        self.as_json().unwrap_or(&NULL)
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiResponse::Json(value) => write!(f, "{}", value),
            ApiResponse::Text(text) => f.write_str(text),
            ApiResponse::Empty => f.write_str("<empty>"),
        }
    }
}

/// Failure of a single API call
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method} {url} -> {status}\nResponse body: {body}")]
    Status {
        status: u16,
        method: Method,
        url: String,
        body: ApiResponse,
    },

    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        source: reqwest::Error,
    },

    #[error("Invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// HTTP status for status failures, `None` otherwise
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a status failure with one of `statuses`
    pub fn is_status_in(&self, statuses: &[u16]) -> bool {
        self.status().is_some_and(|s| statuses.contains(&s))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport { source, .. } if source.is_timeout())
    }
}

/// Builds the underlying HTTP client
pub fn build_http_client(timeout_secs: u64) -> Result<Client, ApiError> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .build()
        .map_err(ApiError::Client)
}

/// Client for the library API
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates an unauthenticated client from the API configuration
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::with_prefix(&config.base_url, &config.api_prefix, config.timeout_secs)
    }

    /// Creates an unauthenticated client for `base_url` + `prefix`
    pub fn with_prefix(base_url: &str, prefix: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let prefix = prefix.trim_matches('/');
        let root = base_url.trim_end_matches('/');
        let base_url = if prefix.is_empty() {
            root.to_string()
        } else {
            format!("{}/{}", root, prefix)
        };

        Ok(Self {
            http: build_http_client(timeout_secs)?,
            base_url,
            token: None,
        })
    }

    /// Returns a copy of this client that sends `token` as bearer auth
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Full URL for an endpoint path relative to the prefix
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse, ApiError> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, path, &[], body).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, ApiError> {
        let raw_url = self.url_for(path);
        let mut url = url::Url::parse(&raw_url).map_err(|source| ApiError::InvalidUrl {
            url: raw_url.clone(),
            source,
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        tracing::debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            method: method.clone(),
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        let text = response.text().await.map_err(|source| ApiError::Transport {
            method: method.clone(),
            url: url.to_string(),
            source,
        })?;

        let body = parse_body(status, is_json, text);

        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                method,
                url: url.to_string(),
                body,
            })
        }
    }
}

/// Interprets a response body
///
/// Malformed JSON is kept as text so error reports still show it.
fn parse_body(status: StatusCode, is_json: bool, text: String) -> ApiResponse {
    if status == StatusCode::NO_CONTENT || text.is_empty() {
        return ApiResponse::Empty;
    }

    if is_json {
        match serde_json::from_str(&text) {
            Ok(value) => ApiResponse::Json(value),
            Err(_) => ApiResponse::Text(text),
        }
    } else {
        ApiResponse::Text(text)
    }
}
