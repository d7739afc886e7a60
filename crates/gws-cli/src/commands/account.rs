//! `gws account ...`: the accounts registry and per-account overrides.

use serde_json::json;
use tracing::{info, warn};

use gws_core::accounts::list_accounts;
use gws_core::accounts::registry::require_account;
use gws_core::auth::{InteractiveAuthorizer, OAuthProvider};
use gws_core::config::services::validate_service;
use gws_core::{
    AccountRegistry, CredentialManager, EffectiveConfig, GlobalConfig, GwsError, GwsResult,
};

use super::Session;
use crate::output::Outcome;

pub struct AddRequest<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub display_name: Option<&'a str>,
    pub force: bool,
}

/// `gws account add`. With `auth` set, the new account is authorized right
/// away; the registration is kept even if that fails.
pub async fn add<P, A>(
    session: &Session,
    request: AddRequest<'_>,
    auth: Option<(P, A)>,
) -> GwsResult<Outcome>
where
    P: OAuthProvider,
    A: InteractiveAuthorizer,
{
    let mut global = session.load()?;
    AccountRegistry::new(&session.store, &mut global).add(
        request.name,
        request.email,
        request.display_name,
        request.force,
    )?;

    let is_default =
        global.accounts.as_ref().and_then(|r| r.default_account.as_deref()) == Some(request.name);

    let authenticated = match auth {
        Some((provider, authorizer)) => {
            let effective = EffectiveConfig::resolve(&session.store, &global, Some(request.name))?;
            let mut manager =
                CredentialManager::new(&session.store, &effective, provider, authorizer)?;
            if let Err(e) = manager.get_credentials(false).await {
                warn!(account = request.name, "Account added but not authorized: {}", e);
                return Err(match e {
                    GwsError::Auth { message, details } => GwsError::Auth {
                        message: format!(
                            "Account '{}' was added but authorization failed: {}",
                            request.name, message
                        ),
                        details,
                    },
                    other => other,
                });
            }
            true
        }
        None => false,
    };

    let token_path = session.store.token_path(Some(request.name))?;
    let message = if authenticated {
        format!("Account '{}' added and authorized.", request.name)
    } else {
        format!(
            "Account '{}' added. Run 'gws auth --account {}' to authorize it.",
            request.name, request.name
        )
    };
    Ok(Outcome::success(
        "account.add",
        json!({
            "account": request.name,
            "message": message,
            "is_default": is_default,
            "authenticated": authenticated,
            "token_path": token_path.display().to_string(),
        }),
    ))
}

pub fn remove(session: &Session, name: &str) -> GwsResult<Outcome> {
    let mut global = session.load()?;
    // Fail with the list of available names before touching anything.
    require_account(&global, name)?;
    AccountRegistry::new(&session.store, &mut global).remove(name)?;

    let default = global
        .accounts
        .as_ref()
        .and_then(|r| r.default_account.clone());
    Ok(Outcome::success(
        "account.remove",
        json!({
            "account": name,
            "message": format!("Account '{}' removed.", name),
            "default": default,
            "multi_account": global.is_multi_account(),
        }),
    ))
}

pub fn list(session: &Session) -> GwsResult<Outcome> {
    let global = session.load()?;
    let accounts = list_accounts(&global);
    let default = global
        .accounts
        .as_ref()
        .and_then(|r| r.default_account.as_deref());
    Ok(Outcome::success(
        "account.list",
        json!({
            "count": accounts.len(),
            "default": default,
            "accounts": accounts,
        }),
    ))
}

pub fn set_default(session: &Session, name: &str) -> GwsResult<Outcome> {
    let mut global = session.load()?;
    require_account(&global, name)?;
    AccountRegistry::new(&session.store, &mut global).set_default(name)?;
    Ok(Outcome::success(
        "account.default",
        json!({
            "account": name,
            "message": format!("Default account set to '{}'.", name),
        }),
    ))
}

pub fn update(
    session: &Session,
    name: &str,
    display_name: Option<&str>,
    email: Option<&str>,
) -> GwsResult<Outcome> {
    let mut global = session.load()?;
    require_account(&global, name)?;
    let changed = AccountRegistry::new(&session.store, &mut global).update(name, display_name, email)?;

    let summary = list_accounts(&global).remove(name);
    Ok(Outcome::success(
        "account.update",
        json!({
            "account": name,
            "updated": changed,
            "message": if changed {
                format!("Account '{}' updated.", name)
            } else {
                "Nothing to update; pass --display-name or --email.".to_string()
            },
            "details": summary,
        }),
    ))
}

/// `gws account config <name>`: raw overrides next to the merged result.
pub fn show_config(session: &Session, name: &str) -> GwsResult<Outcome> {
    let global = session.load()?;
    require_account(&global, name)?;
    let overrides = session.store.load_override(name)?;
    let effective = EffectiveConfig::merge(&global, name, &overrides);
    let settings = effective.settings();

    Ok(Outcome::success(
        "account.config",
        json!({
            "account": name,
            "has_overrides": !overrides.is_empty(),
            "overrides": overrides,
            "effective": {
                "enabled_services": settings.enabled_services,
                "kroki_url": settings.kroki_url,
                "security_enabled": settings.security_enabled,
                "read_only": effective.is_read_only(),
                "allowed_operations": effective.allowed_operations(),
            },
        }),
    ))
}

pub fn config_enable(session: &Session, name: &str, service: &str) -> GwsResult<Outcome> {
    let global = load_account(session, name)?;
    validate_service(service)?;
    let (overrides, changed) = session
        .store
        .update_override(name, |o| o.enable_service(&global.settings, service))?;
    info!(account = name, service, changed, "Account service enabled");
    Ok(Outcome::success(
        "account.config-enable",
        json!({
            "account": name,
            "message": if changed {
                format!("Service '{}' enabled for account '{}'.", service, name)
            } else {
                format!("Service '{}' was already enabled for account '{}'.", service, name)
            },
            "enabled_services": overrides.enabled_services,
        }),
    ))
}

pub fn config_disable(session: &Session, name: &str, service: &str) -> GwsResult<Outcome> {
    let global = load_account(session, name)?;
    validate_service(service)?;
    let (overrides, changed) = session
        .store
        .update_override(name, |o| o.disable_service(&global.settings, service))?;
    info!(account = name, service, changed, "Account service disabled");
    Ok(Outcome::success(
        "account.config-disable",
        json!({
            "account": name,
            "message": if changed {
                format!("Service '{}' disabled for account '{}'.", service, name)
            } else {
                format!("Service '{}' was already disabled for account '{}'.", service, name)
            },
            "enabled_services": overrides.enabled_services,
        }),
    ))
}

pub fn config_reset(session: &Session, name: &str) -> GwsResult<Outcome> {
    load_account(session, name)?;
    let removed = session.store.clear_override(name)?;
    Ok(Outcome::success(
        "account.config-reset",
        json!({
            "account": name,
            "removed": removed,
            "message": format!("Account '{}' now inherits the global configuration.", name),
        }),
    ))
}

pub fn set_readonly(session: &Session, name: &str) -> GwsResult<Outcome> {
    load_account(session, name)?;
    let (overrides, _) = session.store.update_override(name, |o| o.set_read_only())?;
    info!(account = name, "Account restricted to read-only operations");
    Ok(Outcome::success(
        "account.set-readonly",
        json!({
            "account": name,
            "message": format!("Account '{}' is now read-only.", name),
            "allowed_operations": overrides.allowed_operations,
        }),
    ))
}

pub fn clear_readonly(session: &Session, name: &str) -> GwsResult<Outcome> {
    load_account(session, name)?;
    let (overrides, cleared) = session.store.update_override(name, |o| o.clear_read_only())?;
    if overrides.is_empty() {
        session.store.clear_override(name)?;
    }
    Ok(Outcome::success(
        "account.clear-readonly",
        json!({
            "account": name,
            "message": if cleared {
                format!("Read-only restriction removed from account '{}'.", name)
            } else {
                format!("Account '{}' was not read-only.", name)
            },
        }),
    ))
}

fn load_account(session: &Session, name: &str) -> GwsResult<GlobalConfig> {
    let global = session.load()?;
    require_account(&global, name)?;
    Ok(global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::*;

    async fn add_plain(session: &Session, name: &str, force: bool) -> GwsResult<Outcome> {
        let request = AddRequest {
            name,
            email: None,
            display_name: None,
            force,
        };
        add(session, request, None::<(OfflineProvider, BrowserStub)>).await
    }

    #[tokio::test]
    async fn test_add_account_success() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        let outcome = add_plain(&session, "work", false).await.unwrap();
        assert_eq!(outcome.document["status"], "success");
        assert_eq!(outcome.document["account"], "work");
        assert_eq!(outcome.document["is_default"], true);
        assert!(dir.path().join("accounts").join("work").is_dir());
    }

    #[tokio::test]
    async fn test_add_duplicate_account_fails() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        add_plain(&session, "work", false).await.unwrap();
        let err = add_plain(&session, "work", false).await.unwrap_err();
        assert_eq!(err.code().as_str(), "ACCOUNT_EXISTS");
        assert!(add_plain(&session, "work", true).await.is_ok());
    }

    #[tokio::test]
    async fn test_add_invalid_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = add_plain(&session(&dir), "../evil", false).await.unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_ACCOUNT_NAME");
        assert_eq!(err.code().exit_code().code(), 3);
    }

    #[tokio::test]
    async fn test_add_with_auth() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        let request = AddRequest {
            name: "work",
            email: Some("me@work.example"),
            display_name: Some("Work Me"),
            force: false,
        };
        let outcome = add(
            &session,
            request,
            Some((OfflineProvider::default(), BrowserStub::default())),
        )
        .await
        .unwrap();
        assert_eq!(outcome.document["authenticated"], true);
        assert!(session.store.token_path(Some("work")).unwrap().exists());
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        add_plain(&session, "work", false).await.unwrap();
        add_plain(&session, "personal", false).await.unwrap();

        let outcome = remove(&session, "work").unwrap();
        assert_eq!(outcome.document["status"], "success");
        assert_eq!(outcome.document["default"], "personal");

        let err = remove(&session, "nonexistent").unwrap_err();
        assert_eq!(err.code().as_str(), "NOT_FOUND");
        assert_eq!(err.details().unwrap(), "Available accounts: personal");

        let outcome = remove(&session, "personal").unwrap();
        assert_eq!(outcome.document["multi_account"], false);
    }

    #[tokio::test]
    async fn test_list() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        let outcome = list(&session).unwrap();
        assert_eq!(outcome.document["count"], 0);
        assert_eq!(outcome.document["accounts"], json!({}));

        add_plain(&session, "work", false).await.unwrap();
        add_plain(&session, "personal", false).await.unwrap();
        let outcome = list(&session).unwrap();
        assert_eq!(outcome.document["count"], 2);
        assert_eq!(outcome.document["default"], "work");
        assert_eq!(outcome.document["accounts"]["work"]["is_default"], true);
        assert_eq!(outcome.document["accounts"]["personal"]["is_default"], false);
    }

    #[tokio::test]
    async fn test_set_default() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        add_plain(&session, "work", false).await.unwrap();
        add_plain(&session, "personal", false).await.unwrap();

        let outcome = set_default(&session, "personal").unwrap();
        assert_eq!(outcome.document["account"], "personal");
        assert_eq!(list(&session).unwrap().document["default"], "personal");

        let err = set_default(&session, "nonexistent").unwrap_err();
        assert_eq!(err.code().exit_code().code(), 4);
    }

    #[tokio::test]
    async fn test_update() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        add_plain(&session, "work", false).await.unwrap();
        let outcome = update(&session, "work", Some("Work Me"), None).unwrap();
        assert_eq!(outcome.document["updated"], true);
        assert_eq!(outcome.document["details"]["display_name"], "Work Me");
        assert_eq!(
            update(&session, "work", None, None).unwrap().document["updated"],
            false
        );
    }

    #[tokio::test]
    async fn test_show_config() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        add_plain(&session, "work", false).await.unwrap();

        let outcome = show_config(&session, "work").unwrap();
        assert_eq!(outcome.document["account"], "work");
        assert_eq!(outcome.document["has_overrides"], false);
        assert_eq!(outcome.document["effective"]["read_only"], false);

        let err = show_config(&session, "nonexistent").unwrap_err();
        assert_eq!(err.code().as_str(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_config_enable_disable_service() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        add_plain(&session, "work", false).await.unwrap();

        let outcome = config_disable(&session, "work", "gmail").unwrap();
        let enabled = outcome.document["enabled_services"].as_array().unwrap();
        assert!(!enabled.contains(&json!("gmail")));
        // global untouched
        assert!(session.load().unwrap().settings.is_service_enabled("gmail"));

        let outcome = config_enable(&session, "work", "gmail").unwrap();
        let enabled = outcome.document["enabled_services"].as_array().unwrap();
        assert!(enabled.contains(&json!("gmail")));

        let err = config_enable(&session, "work", "invalid_svc").unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_SERVICE");
    }

    #[tokio::test]
    async fn test_config_reset() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        add_plain(&session, "work", false).await.unwrap();
        config_disable(&session, "work", "docs").unwrap();

        let outcome = config_reset(&session, "work").unwrap();
        assert_eq!(outcome.document["removed"], true);
        assert_eq!(
            show_config(&session, "work").unwrap().document["has_overrides"],
            false
        );
    }

    #[tokio::test]
    async fn test_readonly_toggle() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        add_plain(&session, "work", false).await.unwrap();

        let outcome = set_readonly(&session, "work").unwrap();
        assert!(outcome.document["allowed_operations"]["gmail"].is_array());

        let global = session.load().unwrap();
        let scoped = session_for(&dir, "work");
        let ctx = scoped.context(&global).unwrap();
        let err = ctx.authorize("gmail", "send").unwrap_err();
        assert_eq!(err.code().as_str(), "OPERATION_NOT_ALLOWED");

        clear_readonly(&session, "work").unwrap();
        assert!(!session.store.account_dir("work").unwrap().join("config.json").exists());
        let outcome = clear_readonly(&session, "work").unwrap();
        assert_eq!(outcome.document["message"], "Account 'work' was not read-only.");
    }
}
