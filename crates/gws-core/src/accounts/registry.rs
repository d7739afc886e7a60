//! Account registry mutations.
//!
//! Every mutation is computed on a copy of the configuration, saved, and only
//! then committed to the caller's in-memory value, so a failed write never
//! leaves half-applied state behind.

use std::collections::BTreeMap;

use tracing::{info, warn};

use super::{list_accounts, validate_account_name, AccountEntry, AccountSummary, AccountsRegistry};
use crate::common::{GwsError, GwsResult};
use crate::config::{ConfigStore, GlobalConfig};

pub struct AccountRegistry<'a> {
    store: &'a ConfigStore,
    config: &'a mut GlobalConfig,
}

impl<'a> AccountRegistry<'a> {
    pub fn new(store: &'a ConfigStore, config: &'a mut GlobalConfig) -> Self {
        Self { store, config }
    }

    /// Register an account and create its storage directory. The first
    /// account ever added becomes the default.
    pub fn add(
        &mut self,
        name: &str,
        email: Option<&str>,
        display_name: Option<&str>,
        overwrite: bool,
    ) -> GwsResult<()> {
        validate_account_name(name)?;

        let exists = self
            .config
            .accounts
            .as_ref()
            .map(|r| r.contains(name))
            .unwrap_or(false);
        if exists && !overwrite {
            return Err(GwsError::AlreadyExists(name.to_string()));
        }

        let created_dir = !self.store.account_dir(name)?.is_dir();
        self.store.create_account_dir(name)?;

        let mut next = self.config.clone();
        let registry = next.accounts.get_or_insert_with(AccountsRegistry::default);
        registry.entries.insert(
            name.to_string(),
            AccountEntry {
                display_name: display_name.filter(|s| !s.is_empty()).map(String::from),
                email: email.filter(|s| !s.is_empty()).map(String::from),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        let default_is_valid = registry
            .default_account
            .as_ref()
            .map(|d| registry.entries.contains_key(d))
            .unwrap_or(false);
        if !default_is_valid {
            registry.default_account = Some(name.to_string());
        }

        if let Err(e) = self.commit(next) {
            if created_dir {
                if let Err(cleanup) = self.store.remove_account_dir(name) {
                    warn!(account = name, "Could not remove new account directory: {}", cleanup);
                }
            }
            return Err(e);
        }
        info!(account = name, overwrite = exists, "Added account");
        Ok(())
    }

    /// Remove an account and everything stored for it. Returns false if it
    /// was not registered. Removing the last account reverts to legacy mode.
    /// Once the registry is saved the removal stands, even if deleting the
    /// account directory fails.
    pub fn remove(&mut self, name: &str) -> GwsResult<bool> {
        let mut next = self.config.clone();
        let Some(registry) = next.accounts.as_mut() else {
            return Ok(false);
        };
        if registry.entries.remove(name).is_none() {
            return Ok(false);
        }

        if registry.entries.is_empty() {
            next.accounts = None;
        } else if registry.default_account.as_deref() == Some(name) {
            registry.default_account = registry.entries.keys().next().cloned();
        }

        self.commit(next)?;
        // Committed: a leftover directory is only warned about.
        if let Err(e) = self.store.remove_account_dir(name) {
            warn!(account = name, "Account removed but its directory was not: {}", e);
        }

        match &self.config.accounts {
            Some(registry) => info!(
                account = name,
                default = registry.default_account.as_deref().unwrap_or_default(),
                "Removed account"
            ),
            None => info!(account = name, "Removed last account, reverted to legacy mode"),
        }
        Ok(true)
    }

    /// Make `name` the default account. Returns false if it is not registered.
    pub fn set_default(&mut self, name: &str) -> GwsResult<bool> {
        let mut next = self.config.clone();
        let Some(registry) = next.accounts.as_mut().filter(|r| r.contains(name)) else {
            return Ok(false);
        };
        registry.default_account = Some(name.to_string());
        self.commit(next)?;
        info!(account = name, "Default account changed");
        Ok(true)
    }

    /// Update display name and/or email. Returns true if anything changed.
    pub fn update(
        &mut self,
        name: &str,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> GwsResult<bool> {
        let mut next = self.config.clone();
        let Some(entry) = next
            .accounts
            .as_mut()
            .and_then(|r| r.entries.get_mut(name))
        else {
            return Ok(false);
        };

        if display_name.is_none() && email.is_none() {
            return Ok(false);
        }
        if let Some(display_name) = display_name {
            entry.display_name = Some(display_name).filter(|s| !s.is_empty()).map(String::from);
        }
        if let Some(email) = email {
            entry.email = Some(email).filter(|s| !s.is_empty()).map(String::from);
        }

        self.commit(next)?;
        Ok(true)
    }

    pub fn list(&self) -> BTreeMap<String, AccountSummary> {
        list_accounts(self.config)
    }

    /// Fail with `NotFound` (listing what exists) unless `name` is registered.
    pub fn require(&self, name: &str) -> GwsResult<()> {
        require_account(self.config, name)
    }

    fn commit(&mut self, next: GlobalConfig) -> GwsResult<()> {
        if let Err(e) = self.store.save(&next) {
            warn!("Registry change not saved: {}", e);
            return Err(e);
        }
        *self.config = next;
        Ok(())
    }
}

/// Fail with `NotFound` (listing what exists) unless `name` is registered.
pub fn require_account(config: &GlobalConfig, name: &str) -> GwsResult<()> {
    match &config.accounts {
        Some(registry) if registry.contains(name) => Ok(()),
        Some(registry) => Err(GwsError::NotFound {
            name: name.to_string(),
            available: registry.names(),
        }),
        None => Err(GwsError::NotFound {
            name: name.to_string(),
            available: Vec::new(),
        }),
    }
}
