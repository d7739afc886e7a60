//! Per-invocation context.
//!
//! Built once per command by `load → resolve → merge` and passed explicitly
//! to whatever needs to know which account is active.

use std::path::PathBuf;

use tracing::debug;

use crate::accounts::AccountResolver;
use crate::auth::{Credential, CredentialManager, InteractiveAuthorizer, OAuthProvider};
use crate::common::GwsResult;
use crate::config::{ConfigStore, EffectiveConfig, GlobalConfig};

#[derive(Debug, Clone)]
pub struct InvocationContext<'a> {
    store: &'a ConfigStore,
    display_name: Option<String>,
    effective: EffectiveConfig<'a>,
}

impl<'a> InvocationContext<'a> {
    /// Resolve the account (explicit argument, then `env_hint`, then the
    /// default) and merge its overrides over `global`.
    pub fn resolve(
        store: &'a ConfigStore,
        global: &'a GlobalConfig,
        explicit: Option<&str>,
        env_hint: Option<String>,
    ) -> GwsResult<Self> {
        let account = AccountResolver::new(global)
            .with_env_hint(env_hint)
            .resolve(explicit)?;
        let effective = EffectiveConfig::resolve(store, global, account.as_deref())?;
        let display_name = global
            .account_display_name(account.as_deref())
            .map(String::from);
        debug!(
            account = account.as_deref().unwrap_or("legacy"),
            read_only = effective.is_read_only(),
            "Invocation context ready"
        );
        Ok(Self {
            store,
            display_name,
            effective,
        })
    }

    /// `None` in legacy mode.
    pub fn account(&self) -> Option<&str> {
        self.effective.account()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn config(&self) -> &EffectiveConfig<'a> {
        &self.effective
    }

    pub fn token_path(&self) -> GwsResult<PathBuf> {
        self.store.token_path(self.account())
    }

    /// Check that `service.operation` may run under this context.
    pub fn authorize(&self, service: &str, operation: &str) -> GwsResult<()> {
        self.effective.authorize_operation(service, operation)
    }

    pub fn credential_manager<P, A>(
        &self,
        provider: P,
        authorizer: A,
    ) -> GwsResult<CredentialManager<P, A>>
    where
        P: OAuthProvider,
        A: InteractiveAuthorizer,
    {
        CredentialManager::new(self.store, &self.effective, provider, authorizer)
    }

    /// Gate the operation, then obtain credentials for it. A rejected
    /// operation never reaches the credential manager.
    pub async fn credentials_for<P, A>(
        &self,
        manager: &mut CredentialManager<P, A>,
        service: &str,
        operation: &str,
    ) -> GwsResult<Credential>
    where
        P: OAuthProvider,
        A: InteractiveAuthorizer,
    {
        self.authorize(service, operation)?;
        manager.get_credentials(false).await
    }
}
