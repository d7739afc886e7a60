//! HTTP Client Utilities
//!
//! Shared HTTP client creation with consistent configuration.

use std::time::Duration;

use super::error::GwsError;
use super::GwsResult;

/// Create a reqwest HTTP client with standard configuration
///
/// - 30 second timeout
/// - 10 second connect timeout
pub fn create_http_client() -> GwsResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| GwsError::Token(format!("Failed to build HTTP client: {}", e)))
}
