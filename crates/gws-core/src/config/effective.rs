//! Effective configuration: global settings with one account's overrides applied.

use std::borrow::Cow;

use tracing::debug;

use super::overrides::AccountOverride;
use super::services::OperationAllowlist;
use super::store::ConfigStore;
use super::{GlobalConfig, Settings};
use crate::common::{GwsError, GwsResult};

/// The configuration an operation obeys. Recomputed for every command and
/// never persisted.
///
/// Without an account (or with an empty override) the global settings are
/// borrowed as-is; otherwise a merged copy is owned and the global value is
/// left untouched.
#[derive(Debug, Clone)]
pub struct EffectiveConfig<'a> {
    account: Option<String>,
    settings: Cow<'a, Settings>,
    allowed_operations: Option<OperationAllowlist>,
}

impl<'a> EffectiveConfig<'a> {
    /// Legacy / no-account view: the global settings themselves.
    pub fn global(global: &'a GlobalConfig) -> Self {
        Self {
            account: None,
            settings: Cow::Borrowed(&global.settings),
            allowed_operations: None,
        }
    }

    /// Merge an already loaded override into the global settings.
    pub fn merge(global: &'a GlobalConfig, account: &str, overrides: &AccountOverride) -> Self {
        let settings = if overrides.overrides_settings() {
            Cow::Owned(overrides.apply_to(&global.settings))
        } else {
            Cow::Borrowed(&global.settings)
        };
        Self {
            account: Some(account.to_string()),
            settings,
            allowed_operations: overrides.allowed_operations.clone(),
        }
    }

    /// Load the account's override file (absent file ⇒ empty override) and merge.
    pub fn resolve(
        store: &ConfigStore,
        global: &'a GlobalConfig,
        account: Option<&str>,
    ) -> GwsResult<Self> {
        let Some(account) = account else {
            return Ok(Self::global(global));
        };
        let overrides = store.load_override(account)?;
        debug!(
            account,
            has_overrides = !overrides.is_empty(),
            "Resolved effective configuration"
        );
        Ok(Self::merge(global, account, &overrides))
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn enabled_services(&self) -> &[String] {
        &self.settings.enabled_services
    }

    pub fn allowed_operations(&self) -> Option<&OperationAllowlist> {
        self.allowed_operations.as_ref()
    }

    pub fn is_read_only(&self) -> bool {
        self.allowed_operations.is_some()
    }

    /// True when the settings are the global value itself rather than a copy.
    pub fn is_inherited(&self) -> bool {
        matches!(self.settings, Cow::Borrowed(_))
    }

    /// Gate for an operation about to run. Checked before any network or
    /// authorization collaborator is contacted.
    pub fn authorize_operation(&self, service: &str, operation: &str) -> GwsResult<()> {
        if !self.settings.is_service_enabled(service) {
            return Err(GwsError::ServiceDisabled(service.to_string()));
        }
        let Some(allowed) = &self.allowed_operations else {
            return Ok(());
        };
        // A service absent from the allowlist is denied, not unrestricted.
        let ops = allowed.get(service).map(Vec::as_slice).unwrap_or(&[]);
        if ops.iter().any(|op| op == operation) {
            Ok(())
        } else {
            Err(GwsError::ReadOnlyAccount {
                account: self.account.clone().unwrap_or_default(),
                service: service.to_string(),
                operation: operation.to_string(),
                allowed: ops.to_vec(),
            })
        }
    }
}
