//! gws core
//!
//! Multi-account identity and configuration for the gws Google Workspace CLI:
//! the accounts registry, account resolution, per-account configuration
//! overrides, and the OAuth credential lifecycle of each account.

pub mod accounts;
pub mod auth;
pub mod common;
pub mod config;
pub mod context;

pub use accounts::{AccountRegistry, AccountResolver, ACCOUNT_ENV};
pub use auth::{Credential, CredentialManager, CredentialStatus};
pub use common::{ErrorCode, ExitCode, GwsError, GwsResult};
pub use config::{ConfigStore, EffectiveConfig, GlobalConfig};
pub use context::InvocationContext;
