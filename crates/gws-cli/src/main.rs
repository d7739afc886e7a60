mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gws_core::common::paths::CONFIG_DIR_ENV;
use gws_core::ACCOUNT_ENV;

use cli::Cli;
use commands::Session;
use output::Outcome;

/// Filter env var for diagnostics, e.g. `GWS_LOG=gws_core=debug`.
const LOG_ENV: &str = "GWS_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let operation = cli.command.operation();
    let outcome = match Session::new(
        cli.config_dir.clone(),
        std::env::var(CONFIG_DIR_ENV).ok(),
        cli.account.clone(),
        std::env::var(ACCOUNT_ENV).ok(),
    ) {
        Ok(session) => match commands::run(&cli.command, &session).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(operation, "Command failed: {:?}", e);
                Outcome::from_error(operation, &e)
            }
        },
        Err(e) => Outcome::from_error(operation, &e),
    };

    println!("{}", serde_json::to_string_pretty(&outcome.document)?);
    std::process::exit(outcome.exit.code());
}

// stdout carries the JSON document, so logs go to stderr.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
