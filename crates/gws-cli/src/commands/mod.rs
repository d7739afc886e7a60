//! Command handlers. Each returns an [`Outcome`] so it can be tested without
//! spawning the binary.

pub mod account;
pub mod auth;
pub mod config;

use std::path::PathBuf;

use gws_core::auth::LoopbackAuthorizer;
use gws_core::common::paths::resolve_base_dir;
use gws_core::{ConfigStore, GlobalConfig, GwsResult, InvocationContext};

use crate::cli::{AccountAction, AuthAction, Command, ConfigAction};
use crate::output::Outcome;

/// Everything a handler needs from the process environment, captured once.
pub struct Session {
    pub store: ConfigStore,
    /// `--account`
    pub account: Option<String>,
    /// `$GWS_ACCOUNT`
    pub env_account: Option<String>,
}

impl Session {
    pub fn new(
        config_dir: Option<PathBuf>,
        env_config_dir: Option<String>,
        account: Option<String>,
        env_account: Option<String>,
    ) -> GwsResult<Self> {
        Ok(Self {
            store: ConfigStore::new(resolve_base_dir(config_dir, env_config_dir)?),
            account,
            env_account,
        })
    }

    pub fn load(&self) -> GwsResult<GlobalConfig> {
        self.store.load()
    }

    /// Resolve the account for this invocation against `global`.
    pub fn context<'a>(&'a self, global: &'a GlobalConfig) -> GwsResult<InvocationContext<'a>> {
        InvocationContext::resolve(
            &self.store,
            global,
            self.account.as_deref(),
            self.env_account.clone(),
        )
    }

    pub fn authorizer(&self) -> LoopbackAuthorizer {
        LoopbackAuthorizer::new(self.store.client_secret_path())
    }
}

pub async fn run(command: &Command, session: &Session) -> GwsResult<Outcome> {
    use gws_core::auth::GoogleProvider;

    match command {
        Command::Auth(args) => match args.action {
            None => {
                auth::login(session, args.force, GoogleProvider::default(), session.authorizer())
                    .await
            }
            Some(AuthAction::Status) => {
                auth::status(session, GoogleProvider::default(), session.authorizer()).await
            }
            Some(AuthAction::Logout) => auth::logout(session),
        },
        Command::Config { action } => match action {
            None => config::show(session),
            Some(ConfigAction::List) => config::list(session),
            Some(ConfigAction::Enable { service }) => config::enable(session, service),
            Some(ConfigAction::Disable { service }) => config::disable(session, service),
            Some(ConfigAction::Reset) => config::reset(session),
        },
        Command::Account { action } => match action {
            AccountAction::Add {
                name,
                email,
                display_name,
                force,
                skip_auth,
            } => {
                let request = account::AddRequest {
                    name,
                    email: email.as_deref(),
                    display_name: display_name.as_deref(),
                    force: *force,
                };
                if *skip_auth {
                    account::add(session, request, None::<(GoogleProvider, LoopbackAuthorizer)>)
                        .await
                } else {
                    account::add(
                        session,
                        request,
                        Some((GoogleProvider::default(), session.authorizer())),
                    )
                    .await
                }
            }
            AccountAction::Remove { name } => account::remove(session, name),
            AccountAction::List => account::list(session),
            AccountAction::Default { name } => account::set_default(session, name),
            AccountAction::Update {
                name,
                display_name,
                email,
            } => account::update(session, name, display_name.as_deref(), email.as_deref()),
            AccountAction::Config { name } => account::show_config(session, name),
            AccountAction::ConfigEnable { name, service } => {
                account::config_enable(session, name, service)
            }
            AccountAction::ConfigDisable { name, service } => {
                account::config_disable(session, name, service)
            }
            AccountAction::ConfigReset { name } => account::config_reset(session, name),
            AccountAction::SetReadonly { name } => account::set_readonly(session, name),
            AccountAction::ClearReadonly { name } => account::clear_readonly(session, name),
        },
    }
}
