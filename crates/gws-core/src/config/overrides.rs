//! Per-account configuration overrides (`accounts/<name>/config.json`).
//!
//! Every key is optional; an absent key inherits the global value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::services::{read_only_operations, OperationAllowlist};
use super::Settings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_services: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kroki_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowlisted_documents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowlisted_emails: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_security_services: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_security_operations: Option<BTreeMap<String, bool>>,
    /// Restricts the account to these operations per service when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_operations: Option<OperationAllowlist>,
}

impl AccountOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether any settings key (everything except `allowed_operations`) is set.
    pub fn overrides_settings(&self) -> bool {
        Self {
            allowed_operations: None,
            ..self.clone()
        } != Self::default()
    }

    /// Enable a service for this account only. Editing starts from the
    /// override's own list, or from `global` when there is none, and the
    /// whole list is stored. Returns true if the service was added.
    pub fn enable_service(&mut self, global: &Settings, service: &str) -> bool {
        let list = self.services_mut(global);
        if list.iter().any(|s| s == service) {
            return false;
        }
        list.push(service.to_string());
        true
    }

    /// Disable a service for this account only. Returns true if it was removed.
    pub fn disable_service(&mut self, global: &Settings, service: &str) -> bool {
        let list = self.services_mut(global);
        let before = list.len();
        list.retain(|s| s != service);
        list.len() != before
    }

    /// Restrict the account to the read-only operation table.
    pub fn set_read_only(&mut self) {
        self.allowed_operations = Some(read_only_operations());
    }

    /// Drop the operation restriction, leaving every other key alone.
    pub fn clear_read_only(&mut self) -> bool {
        self.allowed_operations.take().is_some()
    }

    fn services_mut(&mut self, global: &Settings) -> &mut Vec<String> {
        self.enabled_services
            .get_or_insert_with(|| global.enabled_services.clone())
    }

    /// Overlay this override onto `base`. Lists and maps replace the base
    /// value wholesale; they are never merged element by element.
    pub fn apply_to(&self, base: &Settings) -> Settings {
        Settings {
            enabled_services: self
                .enabled_services
                .clone()
                .unwrap_or_else(|| base.enabled_services.clone()),
            kroki_url: self
                .kroki_url
                .clone()
                .unwrap_or_else(|| base.kroki_url.clone()),
            security_enabled: self.security_enabled.unwrap_or(base.security_enabled),
            allowlisted_documents: self
                .allowlisted_documents
                .clone()
                .unwrap_or_else(|| base.allowlisted_documents.clone()),
            allowlisted_emails: self
                .allowlisted_emails
                .clone()
                .unwrap_or_else(|| base.allowlisted_emails.clone()),
            disabled_security_services: self
                .disabled_security_services
                .clone()
                .unwrap_or_else(|| base.disabled_security_services.clone()),
            disabled_security_operations: self
                .disabled_security_operations
                .clone()
                .unwrap_or_else(|| base.disabled_security_operations.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sparse_serialization() {
        let o = AccountOverride {
            enabled_services: Some(vec!["docs".into()]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&o).unwrap(),
            json!({"enabled_services": ["docs"]})
        );
        assert!(!o.is_empty());
        assert!(AccountOverride::default().is_empty());
    }

    #[test]
    fn test_apply_replaces_lists_wholesale() {
        let base = Settings {
            allowlisted_documents: vec!["a".into(), "b".into()],
            ..Settings::default()
        };
        let o = AccountOverride {
            enabled_services: Some(vec!["docs".into()]),
            allowlisted_documents: Some(vec!["c".into()]),
            security_enabled: Some(false),
            ..Default::default()
        };
        let merged = o.apply_to(&base);
        assert_eq!(merged.enabled_services, vec!["docs"]);
        assert_eq!(merged.allowlisted_documents, vec!["c"]);
        assert!(!merged.security_enabled);
        assert_eq!(merged.kroki_url, base.kroki_url);
    }

    #[test]
    fn test_account_service_edits_start_from_global() {
        let global = Settings {
            enabled_services: vec!["docs".into(), "gmail".into()],
            ..Settings::default()
        };
        let mut o = AccountOverride::default();
        assert!(o.disable_service(&global, "gmail"));
        assert_eq!(o.enabled_services.as_deref(), Some(&["docs".to_string()][..]));
        assert!(!o.disable_service(&global, "gmail"));
        assert!(o.enable_service(&global, "drive"));
        assert!(!o.enable_service(&global, "drive"));
        assert_eq!(o.enabled_services.unwrap(), vec!["docs", "drive"]);
        // global untouched
        assert_eq!(global.enabled_services, vec!["docs", "gmail"]);
    }

    #[test]
    fn test_read_only_toggle_keeps_other_keys() {
        let mut o = AccountOverride {
            kroki_url: Some("http://kroki.local".into()),
            ..Default::default()
        };
        o.set_read_only();
        assert!(o.allowed_operations.is_some());
        assert!(o.clear_read_only());
        assert!(!o.clear_read_only());
        assert_eq!(o.kroki_url.as_deref(), Some("http://kroki.local"));
    }

    #[test]
    fn test_allowed_operations_only() {
        let raw = json!({"allowed_operations": {"gmail": ["read"]}});
        let o: AccountOverride = serde_json::from_value(raw).unwrap();
        assert!(!o.is_empty());
        assert!(!o.overrides_settings());
        assert_eq!(o.allowed_operations.unwrap()["gmail"], vec!["read"]);
    }
}
