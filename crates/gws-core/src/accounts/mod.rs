//! Named accounts
//!
//! The accounts registry embedded in `gws_config.json`, the operations that
//! mutate it, and the rules for picking which account an invocation targets.
//! A configuration without a registry is in legacy single-identity mode.

pub mod name;
pub mod registry;
pub mod resolver;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::GlobalConfig;

pub use name::validate_account_name;
pub use registry::AccountRegistry;
pub use resolver::{AccountResolver, ACCOUNT_ENV};

/// One registered identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountEntry {
    /// Label used as the mail "From" name. Stored under `name` on disk.
    #[serde(
        rename = "name",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    /// RFC 3339 creation time.
    #[serde(default)]
    pub created_at: String,
}

/// Registry of named accounts.
///
/// Invariant: when `entries` is non-empty, `default_account` names one of
/// them. An empty registry is never stored; the whole field is dropped
/// instead (legacy mode).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountsRegistry {
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_account: Option<String>,
    #[serde(default)]
    pub entries: BTreeMap<String, AccountEntry>,
}

impl AccountsRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Listing view of an account (no secrets).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub created_at: String,
    pub is_default: bool,
}

/// All accounts with their metadata and default flag; empty in legacy mode.
pub fn list_accounts(config: &GlobalConfig) -> BTreeMap<String, AccountSummary> {
    let Some(registry) = &config.accounts else {
        return BTreeMap::new();
    };
    registry
        .entries
        .iter()
        .map(|(name, entry)| {
            (
                name.clone(),
                AccountSummary {
                    display_name: entry.display_name.clone(),
                    email: entry.email.clone(),
                    created_at: entry.created_at.clone(),
                    is_default: registry.default_account.as_deref() == Some(name.as_str()),
                },
            )
        })
        .collect()
}

// Older configuration files store "" for unset values.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_empty_strings_read_as_absent() {
        let raw = json!({
            "default_account": "",
            "entries": {"work": {"name": "", "email": "", "created_at": ""}}
        });
        let registry: AccountsRegistry = serde_json::from_value(raw).unwrap();
        assert!(registry.default_account.is_none());
        assert_eq!(registry.entries["work"], AccountEntry::default());
    }

    #[test]
    fn test_display_name_stored_as_name() {
        let entry = AccountEntry {
            display_name: Some("Jo Doe".into()),
            email: None,
            created_at: "2025-01-01T00:00:00+00:00".into(),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"name": "Jo Doe", "created_at": "2025-01-01T00:00:00+00:00"})
        );
    }

    #[test]
    fn test_list_legacy_is_empty() {
        assert!(list_accounts(&GlobalConfig::default()).is_empty());
    }
}
