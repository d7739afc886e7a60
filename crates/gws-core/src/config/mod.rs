//! Configuration management
//!
//! The global configuration (`gws_config.json`), the sparse per-account
//! overrides, and the merge of both into the configuration an operation
//! actually obeys.
//!
//! Commands follow a `load → resolve → use → [mutate → save]` pipeline:
//! the [`EffectiveConfig`] is an immutable value for the whole command and
//! nothing here reloads configuration behind the caller's back.

pub mod effective;
pub mod overrides;
pub mod services;
pub mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::accounts::AccountsRegistry;

pub use effective::EffectiveConfig;
pub use overrides::AccountOverride;
pub use services::{OperationAllowlist, ALL_SERVICES};
pub use store::ConfigStore;

pub const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// Settings shared by the global file and the per-account overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enabled_services: Vec<String>,
    pub kroki_url: String,
    /// Prompt-injection protection for externally sourced content.
    pub security_enabled: bool,
    /// Docs/Sheets/Slides IDs exempt from content wrapping.
    pub allowlisted_documents: Vec<String>,
    /// Gmail message IDs exempt from content wrapping.
    pub allowlisted_emails: Vec<String>,
    pub disabled_security_services: Vec<String>,
    /// Keyed by `service.operation`, e.g. `gmail.send`.
    pub disabled_security_operations: BTreeMap<String, bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled_services: services::all_services(),
            kroki_url: DEFAULT_KROKI_URL.to_string(),
            security_enabled: true,
            allowlisted_documents: Vec::new(),
            allowlisted_emails: Vec::new(),
            disabled_security_services: Vec::new(),
            disabled_security_operations: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn is_service_enabled(&self, service: &str) -> bool {
        self.enabled_services.iter().any(|s| s == service)
    }

    /// Enable a catalog service. Returns true if anything changed.
    pub fn enable_service(&mut self, service: &str) -> bool {
        if !services::is_known_service(service) || self.is_service_enabled(service) {
            return false;
        }
        self.enabled_services.push(service.to_string());
        true
    }

    /// Disable a service. Returns true if anything changed.
    pub fn disable_service(&mut self, service: &str) -> bool {
        let before = self.enabled_services.len();
        self.enabled_services.retain(|s| s != service);
        self.enabled_services.len() != before
    }

    /// Whether a source is exempt from content wrapping.
    pub fn is_allowlisted(&self, source_type: &str, source_id: &str) -> bool {
        let list = match source_type {
            "email" | "message" => &self.allowlisted_emails,
            "document" | "docs" | "spreadsheet" | "sheets" | "slides" => {
                &self.allowlisted_documents
            }
            _ => return false,
        };
        list.iter().any(|id| id == source_id)
    }

    /// Whether content security applies to an operation such as `gmail.read`.
    pub fn is_security_enabled_for_operation(&self, operation: &str) -> bool {
        if !self.security_enabled {
            return false;
        }
        if let Some(disabled) = self.disabled_security_operations.get(operation) {
            return !disabled;
        }
        let service = operation.split('.').next().unwrap_or(operation);
        !self.disabled_security_services.iter().any(|s| s == service)
    }
}

/// Contents of `gws_config.json`.
///
/// `accounts` is absent in legacy single-identity mode, and is omitted from
/// the file entirely in that case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(flatten)]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts: Option<AccountsRegistry>,
}

impl GlobalConfig {
    /// True when a registry with at least one account exists.
    pub fn is_multi_account(&self) -> bool {
        self.accounts
            .as_ref()
            .map(|registry| !registry.entries.is_empty())
            .unwrap_or(false)
    }

    /// Re-enable every catalog service.
    pub fn reset_services(&mut self) {
        self.settings.enabled_services = services::all_services();
    }

    /// Display name registered for an account, used as the mail "From" label.
    pub fn account_display_name(&self, account: Option<&str>) -> Option<&str> {
        let registry = self.accounts.as_ref()?;
        registry.entries.get(account?)?.display_name.as_deref()
    }
}
