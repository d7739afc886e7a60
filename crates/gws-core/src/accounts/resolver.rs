//! Account resolution.
//!
//! Priority, highest first:
//! 1. the explicit `--account` argument,
//! 2. the `GWS_ACCOUNT` hint,
//! 3. the registry's default account,
//! 4. none (legacy mode).
//!
//! A name from (1) or (2) that is not registered is an error; it never falls
//! back to a lower-priority source.

use tracing::{debug, warn};

use super::registry::require_account;
use crate::common::{GwsError, GwsResult};
use crate::config::GlobalConfig;

/// Environment variable naming the account to use.
pub const ACCOUNT_ENV: &str = "GWS_ACCOUNT";

pub struct AccountResolver<'a> {
    config: &'a GlobalConfig,
    env_hint: Option<String>,
}

impl<'a> AccountResolver<'a> {
    pub fn new(config: &'a GlobalConfig) -> Self {
        Self {
            config,
            env_hint: None,
        }
    }

    /// Attach the value of the account-hint variable, read by the caller.
    pub fn with_env_hint(mut self, hint: Option<String>) -> Self {
        self.env_hint = hint.filter(|h| !h.is_empty());
        self
    }

    /// Pick the account for this invocation; `None` means legacy mode.
    pub fn resolve(&self, explicit: Option<&str>) -> GwsResult<Option<String>> {
        let requested = explicit
            .filter(|name| !name.is_empty())
            .map(|name| (name, "argument"))
            .or_else(|| self.env_hint.as_deref().map(|name| (name, ACCOUNT_ENV)));

        if let Some((name, source)) = requested {
            if !self.config.is_multi_account() {
                return Err(GwsError::NoAccountsConfigured(name.to_string()));
            }
            require_account(self.config, name)?;
            debug!(account = name, source, "Resolved account");
            return Ok(Some(name.to_string()));
        }

        let Some(registry) = self.config.accounts.as_ref().filter(|r| !r.entries.is_empty())
        else {
            debug!("No accounts registry, using legacy mode");
            return Ok(None);
        };

        match &registry.default_account {
            Some(name) => {
                require_account(self.config, name)?;
                debug!(account = %name, source = "default", "Resolved account");
                Ok(Some(name.clone()))
            }
            None => {
                let first = registry.entries.keys().next().cloned();
                warn!(
                    "Accounts registry has no default account, using {:?}",
                    first
                );
                Ok(first)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountRegistry;
    use crate::config::ConfigStore;

    fn with_accounts(names: &[&str]) -> (tempfile::TempDir, GlobalConfig) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let mut config = GlobalConfig::default();
        let mut registry = AccountRegistry::new(&store, &mut config);
        for name in names {
            registry.add(name, None, None, false).unwrap();
        }
        (dir, config)
    }

    #[test]
    fn test_legacy_mode_resolves_to_none() {
        let config = GlobalConfig::default();
        assert_eq!(AccountResolver::new(&config).resolve(None).unwrap(), None);
    }

    #[test]
    fn test_default_account() {
        let (_dir, config) = with_accounts(&["work", "personal"]);
        assert_eq!(
            AccountResolver::new(&config).resolve(None).unwrap().as_deref(),
            Some("work")
        );
    }

    #[test]
    fn test_env_hint_beats_default() {
        let (_dir, config) = with_accounts(&["work", "personal"]);
        let resolver = AccountResolver::new(&config).with_env_hint(Some("personal".into()));
        assert_eq!(resolver.resolve(None).unwrap().as_deref(), Some("personal"));
    }

    #[test]
    fn test_explicit_beats_env_hint() {
        let (_dir, config) = with_accounts(&["work", "personal"]);
        let resolver = AccountResolver::new(&config).with_env_hint(Some("personal".into()));
        assert_eq!(resolver.resolve(Some("work")).unwrap().as_deref(), Some("work"));
    }

    #[test]
    fn test_unknown_explicit_never_falls_back() {
        let (_dir, config) = with_accounts(&["work", "personal"]);
        let resolver = AccountResolver::new(&config).with_env_hint(Some("personal".into()));
        assert!(matches!(
            resolver.resolve(Some("x")),
            Err(GwsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_env_hint_is_error() {
        let (_dir, config) = with_accounts(&["work"]);
        let resolver = AccountResolver::new(&config).with_env_hint(Some("nonexistent".into()));
        assert!(matches!(
            resolver.resolve(None),
            Err(GwsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_requested_without_registry() {
        let config = GlobalConfig::default();
        assert!(matches!(
            AccountResolver::new(&config).resolve(Some("work")),
            Err(GwsError::NoAccountsConfigured(_))
        ));
        let resolver = AccountResolver::new(&config).with_env_hint(Some("phantom".into()));
        assert!(matches!(
            resolver.resolve(None),
            Err(GwsError::NoAccountsConfigured(_))
        ));
    }

    #[test]
    fn test_empty_hint_ignored() {
        let config = GlobalConfig::default();
        let resolver = AccountResolver::new(&config).with_env_hint(Some(String::new()));
        assert_eq!(resolver.resolve(Some("")).unwrap(), None);
    }
}
