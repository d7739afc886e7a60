//! Common Utilities
//!
//! Shared error handling, paths, file persistence and HTTP helpers.

pub mod error;
pub mod fs;
pub mod http;
pub mod paths;

pub use error::{ErrorCode, ExitCode, GwsError};
pub use http::create_http_client;

/// Result type used throughout the crate.
pub type GwsResult<T> = Result<T, GwsError>;
