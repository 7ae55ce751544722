//! Cascade CLI - daily weight run for capped multi-asset funds.
//!
//! # Usage
//!
//! ```bash
//! # Run every active fund for today
//! cascade run --config config/cascade.toml
//!
//! # Run one fund for a given date
//! cascade run --date 20251121 --fund vanguard_lifestrat
//!
//! # Show the latest persisted weights
//! cascade show --fund vanguard_lifestrat --date 20251121 --portfolio LSE80
//! ```
//!
//! Exit codes: 0 every fund succeeded, 1 partial success, 2 total failure
//! or an error before the run started.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

/// Exit code for failures outside a run (bad config, bad arguments).
const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cascade=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.format, cli.quiet).await,
        Commands::Show(args) => commands::show::execute(args, cli.format, cli.quiet).map(|()| 0),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            output::print_error(&format!("{e:#}"));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
