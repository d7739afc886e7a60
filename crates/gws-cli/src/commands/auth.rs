use serde_json::json;

use gws_core::auth::store::TokenStore;
use gws_core::auth::{InteractiveAuthorizer, OAuthProvider};
use gws_core::{ExitCode, GwsResult};

use super::Session;
use crate::output::Outcome;

/// `gws auth [--force]`
pub async fn login<P, A>(session: &Session, force: bool, provider: P, authorizer: A) -> GwsResult<Outcome>
where
    P: OAuthProvider,
    A: InteractiveAuthorizer,
{
    let global = session.load()?;
    let ctx = session.context(&global)?;
    let mut manager = ctx.credential_manager(provider, authorizer)?;

    if force && manager.delete_token()? {
        eprintln!("Deleted existing token. Starting fresh authentication...");
    }
    manager.get_credentials(force).await?;

    Ok(Outcome::success(
        "auth",
        json!({
            "message": "Authentication successful. Token is valid and stored.",
            "account": ctx.account(),
            "token_path": manager.token_path().display().to_string(),
        }),
    ))
}

/// `gws auth status`: never opens a browser.
pub async fn status<P, A>(session: &Session, provider: P, authorizer: A) -> GwsResult<Outcome>
where
    P: OAuthProvider,
    A: InteractiveAuthorizer,
{
    let global = session.load()?;
    let ctx = session.context(&global)?;
    let mut manager = ctx.credential_manager(provider, authorizer)?;
    let check = manager.check_credentials().await;

    let mut document = json!({
        "account": ctx.account(),
        "token_path": manager.token_path().display().to_string(),
        "scopes": manager.required_scopes(),
    });
    if check.is_valid {
        document["status"] = json!("authenticated");
        document["message"] = json!(format!("Token is valid ({}).", check.status));
        if let Some(expiry) = check.credential.as_ref().and_then(|c| c.expiry.clone()) {
            document["expiry"] = json!(expiry);
        }
        Ok(Outcome::report(document, ExitCode::Success))
    } else {
        document["status"] = json!("not_authenticated");
        document["message"] = json!(format!("Authentication required: {}", check.status));
        document["hint"] = json!(match ctx.account() {
            Some(name) => format!("Run 'gws auth --account {}' to authenticate.", name),
            None => "Run 'gws auth' to authenticate.".to_string(),
        });
        Ok(Outcome::report(document, ExitCode::OperationFailed))
    }
}

/// `gws auth logout`
pub fn logout(session: &Session) -> GwsResult<Outcome> {
    let global = session.load()?;
    let ctx = session.context(&global)?;
    let tokens = TokenStore::new(ctx.token_path()?);
    let message = if tokens.delete()? {
        "Token deleted successfully."
    } else {
        "No token to delete."
    };
    Ok(Outcome::success(
        "auth.logout",
        json!({
            "message": message,
            "account": ctx.account(),
            "token_path": tokens.path().display().to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::account::{add, AddRequest};
    use crate::commands::testing::*;

    async fn add_account(session: &Session, name: &str) {
        let request = AddRequest {
            name,
            email: None,
            display_name: None,
            force: false,
        };
        add(session, request, None::<(OfflineProvider, BrowserStub)>)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_login_writes_account_token() {
        let dir = tempfile::tempdir().unwrap();
        add_account(&session(&dir), "work").await;

        let session = session_for(&dir, "work");
        let outcome = login(&session, false, OfflineProvider::default(), BrowserStub::default())
            .await
            .unwrap();
        assert_eq!(outcome.document["status"], "success");
        assert_eq!(outcome.document["account"], "work");
        assert!(session.store.token_path(Some("work")).unwrap().exists());
        assert!(!session.store.legacy_token_path().exists());
    }

    #[tokio::test]
    async fn test_status_with_account() {
        let dir = tempfile::tempdir().unwrap();
        add_account(&session(&dir), "work").await;
        let session = session_for(&dir, "work");

        let outcome = status(&session, OfflineProvider::default(), BrowserStub::default())
            .await
            .unwrap();
        assert_eq!(outcome.document["account"], "work");
        assert_eq!(outcome.document["status"], "not_authenticated");
        assert_eq!(outcome.exit, ExitCode::OperationFailed);

        TokenStore::new(session.store.token_path(Some("work")).unwrap())
            .save(&token("ya29", PAST))
            .unwrap();
        let outcome = status(&session, OfflineProvider::default(), BrowserStub::default())
            .await
            .unwrap();
        assert_eq!(outcome.document["status"], "authenticated");
        assert_eq!(outcome.document["message"], "Token is valid (refreshed).");
        assert_eq!(outcome.exit, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_status_unknown_account_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        add_account(&session(&dir), "work").await;
        let session = session_for(&dir, "nonexistent");
        let err = status(&session, OfflineProvider::default(), BrowserStub::default())
            .await
            .unwrap_err();
        assert_eq!(err.code().as_str(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_logout_with_account() {
        let dir = tempfile::tempdir().unwrap();
        add_account(&session(&dir), "work").await;
        let session = session_for(&dir, "work");
        TokenStore::new(session.store.token_path(Some("work")).unwrap())
            .save(&token("ya29", FUTURE))
            .unwrap();

        let outcome = logout(&session).unwrap();
        assert_eq!(outcome.document["operation"], "auth.logout");
        assert_eq!(outcome.document["message"], "Token deleted successfully.");

        let outcome = logout(&session).unwrap();
        assert_eq!(outcome.document["message"], "No token to delete.");
    }

    #[test]
    fn test_legacy_logout() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        std::fs::write(session.store.legacy_token_path(), "{}").unwrap();
        let outcome = logout(&session).unwrap();
        assert!(outcome.document["account"].is_null());
        assert!(!session.store.legacy_token_path().exists());
    }
}
