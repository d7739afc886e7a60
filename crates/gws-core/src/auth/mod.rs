//! OAuth credential lifecycle
//!
//! One [`CredentialManager`] serves one identity: a named account, or the
//! legacy single identity when no account is resolved. The token path is
//! fixed at construction from [`ConfigStore::token_path`], so a manager can
//! never read or write another account's token.
//!
//! Token files that cannot be read are treated as absent and replaced by a
//! fresh authorization. Refresh failures fall back the same way. Only the
//! status probe reports them, as a status string.

pub mod credential;
pub mod flow;
pub mod provider;
pub mod scopes;
pub mod store;

use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

pub use credential::{Credential, CredentialState, TokenLoad};
pub use flow::{ClientSecret, InteractiveAuthorizer, LoopbackAuthorizer};
pub use provider::{GoogleProvider, OAuthProvider, OAuthTokens};
pub use scopes::scopes_for_services;
pub use store::TokenStore;

use crate::common::GwsResult;
use crate::config::{ConfigStore, EffectiveConfig};

/// Outcome of the non-interactive credential probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStatus {
    NoToken,
    Valid,
    Refreshed,
    ExpiredNoRefresh,
    InvalidToken(String),
    RefreshFailed(String),
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialStatus::NoToken => f.write_str("no_token"),
            CredentialStatus::Valid => f.write_str("valid"),
            CredentialStatus::Refreshed => f.write_str("refreshed"),
            CredentialStatus::ExpiredNoRefresh => f.write_str("expired_no_refresh"),
            CredentialStatus::InvalidToken(detail) => write!(f, "invalid_token: {}", detail),
            CredentialStatus::RefreshFailed(detail) => write!(f, "refresh_failed: {}", detail),
        }
    }
}

#[derive(Debug)]
pub struct CredentialCheck {
    pub is_valid: bool,
    pub status: CredentialStatus,
    pub credential: Option<Credential>,
}

impl CredentialCheck {
    fn new(is_valid: bool, status: CredentialStatus, credential: Option<Credential>) -> Self {
        Self {
            is_valid,
            status,
            credential,
        }
    }
}

pub struct CredentialManager<P, A> {
    tokens: TokenStore,
    account: Option<String>,
    scopes: Vec<String>,
    provider: P,
    authorizer: A,
    cached: Option<Credential>,
}

impl<P: OAuthProvider, A: InteractiveAuthorizer> CredentialManager<P, A> {
    /// Manager for the account `effective` was resolved for. Required scopes
    /// come from its enabled services.
    pub fn new(
        store: &ConfigStore,
        effective: &EffectiveConfig<'_>,
        provider: P,
        authorizer: A,
    ) -> GwsResult<Self> {
        let account = effective.account().map(String::from);
        let tokens = TokenStore::new(store.token_path(account.as_deref())?);
        Ok(Self {
            tokens,
            account,
            scopes: scopes_for_services(effective.enabled_services()),
            provider,
            authorizer,
            cached: None,
        })
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn token_path(&self) -> &Path {
        self.tokens.path()
    }

    pub fn required_scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Return a valid credential, refreshing or re-authorizing as needed.
    /// Anything newly obtained is persisted before it is returned.
    pub async fn get_credentials(&mut self, force_refresh: bool) -> GwsResult<Credential> {
        if !force_refresh {
            if let Some(cached) = self.cached.as_ref().filter(|c| c.is_valid()) {
                return Ok(cached.clone());
            }

            match CredentialState::from(self.tokens.load()) {
                CredentialState::Valid(credential) => {
                    self.log_scope_mismatch(&credential);
                    debug!(account = self.label(), "Loaded valid token");
                    self.cached = Some(credential.clone());
                    return Ok(credential);
                }
                CredentialState::ExpiredRefreshable(credential) => {
                    match self.provider.refresh_token(&credential).await {
                        Ok(tokens) => {
                            let refreshed = credential.refreshed(tokens);
                            self.persist(&refreshed)?;
                            info!(account = self.label(), "Refreshed access token");
                            return Ok(refreshed);
                        }
                        Err(e) => warn!(
                            account = self.label(),
                            "Token refresh failed, re-authorizing: {}", e
                        ),
                    }
                }
                CredentialState::ExpiredNonRefreshable(_) => {
                    debug!(account = self.label(), "Token expired without refresh token");
                }
                CredentialState::Invalid(reason) => {
                    warn!(account = self.label(), "Discarding unreadable token: {}", reason);
                }
                CredentialState::NoToken => {
                    debug!(account = self.label(), "No stored token");
                }
            }
        }

        info!(
            account = self.label(),
            scopes = self.scopes.len(),
            "Starting interactive authorization"
        );
        let credential = self
            .authorizer
            .authorize(&self.scopes, self.account.as_deref())
            .await?;
        self.persist(&credential)?;
        Ok(credential)
    }

    /// Probe the stored credential without ever starting interactive
    /// authorization. A successful refresh is persisted.
    pub async fn check_credentials(&mut self) -> CredentialCheck {
        match CredentialState::from(self.tokens.load()) {
            CredentialState::NoToken => CredentialCheck::new(false, CredentialStatus::NoToken, None),
            CredentialState::Invalid(reason) => {
                CredentialCheck::new(false, CredentialStatus::InvalidToken(reason), None)
            }
            CredentialState::Valid(credential) => {
                self.cached = Some(credential.clone());
                CredentialCheck::new(true, CredentialStatus::Valid, Some(credential))
            }
            CredentialState::ExpiredNonRefreshable(credential) => {
                CredentialCheck::new(false, CredentialStatus::ExpiredNoRefresh, Some(credential))
            }
            CredentialState::ExpiredRefreshable(credential) => {
                let refreshed = match self.provider.refresh_token(&credential).await {
                    Ok(tokens) => credential.refreshed(tokens),
                    Err(e) => {
                        warn!(account = self.label(), "Token refresh failed: {}", e);
                        return CredentialCheck::new(
                            false,
                            CredentialStatus::RefreshFailed(e.to_string()),
                            None,
                        );
                    }
                };
                if let Err(e) = self.persist(&refreshed) {
                    return CredentialCheck::new(
                        false,
                        CredentialStatus::RefreshFailed(e.to_string()),
                        None,
                    );
                }
                info!(account = self.label(), "Refreshed access token");
                CredentialCheck::new(true, CredentialStatus::Refreshed, Some(refreshed))
            }
        }
    }

    /// Remove the stored token. Returns whether a file existed.
    pub fn delete_token(&mut self) -> GwsResult<bool> {
        self.cached = None;
        let removed = self.tokens.delete()?;
        if removed {
            info!(account = self.label(), "Deleted token {:?}", self.tokens.path());
        }
        Ok(removed)
    }

    fn persist(&mut self, credential: &Credential) -> GwsResult<()> {
        self.tokens.save(credential)?;
        self.cached = Some(credential.clone());
        Ok(())
    }

    fn log_scope_mismatch(&self, credential: &Credential) {
        let missing: Vec<&String> = self
            .scopes
            .iter()
            .filter(|s| !credential.scopes.contains(s))
            .collect();
        if !missing.is_empty() && !credential.scopes.is_empty() {
            debug!(
                account = self.label(),
                "Stored token lacks scopes {:?}; run 'gws auth --force' to request them",
                missing
            );
        }
    }

    fn label(&self) -> &str {
        self.account.as_deref().unwrap_or("legacy")
    }
}
