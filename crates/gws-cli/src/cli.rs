use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gws", version, about = "Google Workspace CLI: accounts, authentication and service configuration")]
pub struct Cli {
    /// Configuration directory (default: $GWS_CONFIG_DIR or ~/.claude/.google-workspace)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Named account to use (overrides $GWS_ACCOUNT and the default account)
    #[arg(short, long, global = true)]
    pub account: Option<String>,

    /// Debug logging on stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Authenticate with Google, or inspect and remove stored credentials
    Auth(AuthArgs),
    /// Global service configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Named account management
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Args, Debug)]
pub struct AuthArgs {
    /// Delete the stored token and authorize again
    #[arg(short, long)]
    pub force: bool,

    #[command(subcommand)]
    pub action: Option<AuthAction>,
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Check the stored token without opening a browser
    Status,
    /// Remove the stored token
    Logout,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// List every service and whether it is enabled
    List,
    Enable { service: String },
    Disable { service: String },
    /// Enable all services again
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum AccountAction {
    /// Register an account and authorize it
    Add {
        name: String,
        #[arg(long)]
        email: Option<String>,
        /// Name shown as the sender of outgoing mail
        #[arg(long)]
        display_name: Option<String>,
        /// Overwrite an existing account
        #[arg(short, long)]
        force: bool,
        /// Register only; run `gws auth -a <name>` later
        #[arg(long)]
        skip_auth: bool,
    },
    /// Remove an account with its token and overrides
    Remove { name: String },
    List,
    /// Make an account the default
    Default { name: String },
    /// Change an account's display name or email
    Update {
        name: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Show an account's overrides and effective configuration
    Config { name: String },
    ConfigEnable { name: String, service: String },
    ConfigDisable { name: String, service: String },
    /// Drop all overrides so the account inherits the global configuration
    ConfigReset { name: String },
    /// Restrict an account to read-only operations
    SetReadonly { name: String },
    ClearReadonly { name: String },
}

impl Command {
    /// Operation name reported in output documents.
    pub fn operation(&self) -> &'static str {
        match self {
            Command::Auth(args) => match args.action {
                None => "auth",
                Some(AuthAction::Status) => "auth.status",
                Some(AuthAction::Logout) => "auth.logout",
            },
            Command::Config { action } => match action {
                None => "config",
                Some(ConfigAction::List) => "config.list",
                Some(ConfigAction::Enable { .. }) => "config.enable",
                Some(ConfigAction::Disable { .. }) => "config.disable",
                Some(ConfigAction::Reset) => "config.reset",
            },
            Command::Account { action } => match action {
                AccountAction::Add { .. } => "account.add",
                AccountAction::Remove { .. } => "account.remove",
                AccountAction::List => "account.list",
                AccountAction::Default { .. } => "account.default",
                AccountAction::Update { .. } => "account.update",
                AccountAction::Config { .. } => "account.config",
                AccountAction::ConfigEnable { .. } => "account.config-enable",
                AccountAction::ConfigDisable { .. } => "account.config-disable",
                AccountAction::ConfigReset { .. } => "account.config-reset",
                AccountAction::SetReadonly { .. } => "account.set-readonly",
                AccountAction::ClearReadonly { .. } => "account.clear-readonly",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_kebab_case_subcommands() {
        let cli = Cli::try_parse_from(["gws", "account", "config-enable", "work", "docs"]).unwrap();
        assert_eq!(cli.command.operation(), "account.config-enable");

        let cli = Cli::try_parse_from(["gws", "account", "set-readonly", "work"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Account {
                action: AccountAction::SetReadonly { .. }
            }
        ));
    }

    #[test]
    fn test_global_account_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["gws", "auth", "status", "--account", "work"]).unwrap();
        assert_eq!(cli.account.as_deref(), Some("work"));
        assert_eq!(cli.command.operation(), "auth.status");

        let cli = Cli::try_parse_from(["gws", "-a", "personal", "auth", "--force"]).unwrap();
        assert_eq!(cli.account.as_deref(), Some("personal"));
        match cli.command {
            Command::Auth(args) => assert!(args.force && args.action.is_none()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_config_without_action() {
        let cli = Cli::try_parse_from(["gws", "config"]).unwrap();
        assert_eq!(cli.command.operation(), "config");
    }
}
