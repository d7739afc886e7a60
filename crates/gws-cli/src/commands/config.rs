//! `gws config ...`: the global service configuration.

use serde_json::{json, Map, Value};
use tracing::info;

use gws_core::config::services::validate_service;
use gws_core::config::ALL_SERVICES;
use gws_core::GwsResult;

use super::Session;
use crate::output::Outcome;

pub fn show(session: &Session) -> GwsResult<Outcome> {
    let global = session.load()?;
    Ok(Outcome::success(
        "config",
        json!({
            "enabled_services": global.settings.enabled_services,
            "all_services": ALL_SERVICES,
        }),
    ))
}

pub fn list(session: &Session) -> GwsResult<Outcome> {
    let global = session.load()?;
    let services: Map<String, Value> = ALL_SERVICES
        .iter()
        .map(|s| (s.to_string(), json!(global.settings.is_service_enabled(s))))
        .collect();
    Ok(Outcome::success(
        "config.list",
        json!({
            "services": services,
            "enabled_count": global.settings.enabled_services.len(),
            "total_count": ALL_SERVICES.len(),
        }),
    ))
}

pub fn enable(session: &Session, service: &str) -> GwsResult<Outcome> {
    validate_service(service)?;
    let mut global = session.load()?;
    let changed = global.settings.enable_service(service);
    if changed {
        session.store.save(&global)?;
        info!(service, "Service enabled");
    }
    let message = if changed {
        format!("Service '{}' enabled.", service)
    } else {
        format!("Service '{}' was already enabled.", service)
    };
    Ok(Outcome::success(
        "config.enable",
        json!({
            "message": message,
            "enabled_services": global.settings.enabled_services,
        }),
    ))
}

pub fn disable(session: &Session, service: &str) -> GwsResult<Outcome> {
    validate_service(service)?;
    let mut global = session.load()?;
    let changed = global.settings.disable_service(service);
    if changed {
        session.store.save(&global)?;
        info!(service, "Service disabled");
    }
    let message = if changed {
        format!("Service '{}' disabled.", service)
    } else {
        format!("Service '{}' was already disabled.", service)
    };
    Ok(Outcome::success(
        "config.disable",
        json!({
            "message": message,
            "enabled_services": global.settings.enabled_services,
        }),
    ))
}

pub fn reset(session: &Session) -> GwsResult<Outcome> {
    let mut global = session.load()?;
    global.reset_services();
    session.store.save(&global)?;
    Ok(Outcome::success(
        "config.reset",
        json!({
            "message": "Configuration reset to defaults. All services enabled.",
            "enabled_services": global.settings.enabled_services,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::session;

    #[test]
    fn test_disable_enable_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);

        let outcome = disable(&session, "gmail").unwrap();
        assert_eq!(outcome.document["message"], "Service 'gmail' disabled.");
        assert!(!session.load().unwrap().settings.is_service_enabled("gmail"));

        let outcome = disable(&session, "gmail").unwrap();
        assert_eq!(outcome.document["message"], "Service 'gmail' was already disabled.");

        enable(&session, "gmail").unwrap();
        let outcome = list(&session).unwrap();
        assert_eq!(outcome.document["services"]["gmail"], true);
        assert_eq!(outcome.document["total_count"], ALL_SERVICES.len());
    }

    #[test]
    fn test_invalid_service() {
        let dir = tempfile::tempdir().unwrap();
        let err = enable(&session(&dir), "bogus").unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_SERVICE");
        assert!(!dir.path().join("gws_config.json").exists());
    }

    #[test]
    fn test_reset_keeps_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        let mut global = session.load().unwrap();
        gws_core::AccountRegistry::new(&session.store, &mut global)
            .add("work", None, None, false)
            .unwrap();
        disable(&session, "docs").unwrap();

        reset(&session).unwrap();
        let global = session.load().unwrap();
        assert_eq!(global.settings.enabled_services.len(), ALL_SERVICES.len());
        assert!(global.is_multi_account());
    }
}
