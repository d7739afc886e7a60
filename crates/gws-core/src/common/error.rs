//! Common Error Types
//!
//! Unified error handling with stable error-code and exit-code mapping.

use std::path::PathBuf;

/// Process exit codes reported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    OperationFailed = 1,
    InvalidArgs = 3,
    NotFound = 4,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Machine-readable error codes, rendered in JSON error documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidAccountName,
    AccountExists,
    NotFound,
    NoAccountsConfigured,
    OperationNotAllowed,
    ServiceDisabled,
    InvalidService,
    AuthError,
    ConfigError,
    IoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidAccountName => "INVALID_ACCOUNT_NAME",
            ErrorCode::AccountExists => "ACCOUNT_EXISTS",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NoAccountsConfigured => "NO_ACCOUNTS_CONFIGURED",
            ErrorCode::OperationNotAllowed => "OPERATION_NOT_ALLOWED",
            ErrorCode::ServiceDisabled => "SERVICE_DISABLED",
            ErrorCode::InvalidService => "INVALID_SERVICE",
            ErrorCode::AuthError => "AUTH_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::IoError => "IO_ERROR",
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            ErrorCode::InvalidAccountName
            | ErrorCode::AccountExists
            | ErrorCode::NoAccountsConfigured
            | ErrorCode::OperationNotAllowed
            | ErrorCode::ServiceDisabled
            | ErrorCode::InvalidService => ExitCode::InvalidArgs,
            ErrorCode::NotFound => ExitCode::NotFound,
            ErrorCode::AuthError | ErrorCode::ConfigError | ErrorCode::IoError => {
                ExitCode::OperationFailed
            }
        }
    }
}

/// Errors raised by account resolution, configuration and credential handling.
#[derive(Debug, thiserror::Error)]
pub enum GwsError {
    #[error("Invalid account name '{0}'. Use only letters, numbers, hyphens, and underscores.")]
    InvalidName(String),

    #[error("Account '{0}' already exists")]
    AlreadyExists(String),

    #[error("Account '{name}' not found")]
    NotFound { name: String, available: Vec<String> },

    #[error("Account '{0}' specified but no accounts are configured")]
    NoAccountsConfigured(String),

    #[error("Operation '{service}.{operation}' is not allowed for account '{account}'")]
    ReadOnlyAccount {
        account: String,
        service: String,
        operation: String,
        allowed: Vec<String>,
    },

    #[error("Service '{0}' is disabled")]
    ServiceDisabled(String),

    #[error("Unknown service: {0}")]
    InvalidService(String),

    #[error("{message}")]
    Auth {
        message: String,
        details: Option<String>,
    },

    #[error("Token request failed: {0}")]
    Token(String),

    #[error("Could not determine the home directory")]
    NoHomeDir,

    #[error("Failed to parse {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GwsError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            details: None,
        }
    }

    pub fn auth_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GwsError::InvalidName(_) => ErrorCode::InvalidAccountName,
            GwsError::AlreadyExists(_) => ErrorCode::AccountExists,
            GwsError::NotFound { .. } => ErrorCode::NotFound,
            GwsError::NoAccountsConfigured(_) => ErrorCode::NoAccountsConfigured,
            GwsError::ReadOnlyAccount { .. } => ErrorCode::OperationNotAllowed,
            GwsError::ServiceDisabled(_) => ErrorCode::ServiceDisabled,
            GwsError::InvalidService(_) => ErrorCode::InvalidService,
            GwsError::Auth { .. } | GwsError::Token(_) => ErrorCode::AuthError,
            GwsError::Config { .. } | GwsError::NoHomeDir => ErrorCode::ConfigError,
            GwsError::Io { .. } => ErrorCode::IoError,
        }
    }

    /// Hint telling the user how to fix the problem, when one exists.
    pub fn details(&self) -> Option<String> {
        match self {
            GwsError::NotFound { available, .. } if available.is_empty() => {
                Some("No accounts are configured.".to_string())
            }
            GwsError::NotFound { available, .. } => {
                Some(format!("Available accounts: {}", available.join(", ")))
            }
            GwsError::AlreadyExists(name) => Some(format!(
                "Use --force to overwrite account '{}'.",
                name
            )),
            GwsError::NoAccountsConfigured(_) => {
                Some("Use 'gws account add <name>' to set up multi-account mode.".to_string())
            }
            GwsError::ReadOnlyAccount { allowed, .. } => {
                Some(format!("Allowed: {}", allowed.join(", ")))
            }
            GwsError::ServiceDisabled(service) => Some(format!(
                "Enable it with 'gws config enable {}' or 'gws account config-enable <name> {}'.",
                service, service
            )),
            GwsError::InvalidService(_) => Some(format!(
                "Valid services: {}",
                crate::config::services::ALL_SERVICES.join(", ")
            )),
            GwsError::Auth { details, .. } => details.clone(),
            GwsError::Config { .. } => {
                Some("Fix or remove the file; it was left untouched.".to_string())
            }
            GwsError::NoHomeDir => Some(format!(
                "Set {} or pass --config-dir to choose a configuration directory.",
                crate::common::paths::CONFIG_DIR_ENV
            )),
            _ => None,
        }
    }
}
