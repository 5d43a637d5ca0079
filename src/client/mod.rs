//! Client module for talking to the library API
//!
//! This module contains:
//! - The HTTP transport with structured error translation
//! - The endpoint path table
//! - Session bootstrap (admin login)

pub mod endpoints;
mod session;
mod transport;

pub use session::{login, open_session};
pub use transport::{build_http_client, ApiClient, ApiError, ApiResponse};
