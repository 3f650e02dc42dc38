//! km - Keymatic console CLI
//!
//! Drives the console's session and tenant logic from a terminal. Output is
//! JSON on stdout; logs go to stderr.
//!
//! # Examples
//!
//! ```bash
//! # Start a login (prints the identity provider URL to visit)
//! km login --pretty
//!
//! # Finish it with the URL the browser was sent back to
//! km callback "http://localhost:5173/?code=...&state=..."
//!
//! # Resolve the tenant, trying "acme" first
//! km resolve --candidate acme
//!
//! # Same, then dump the lookup counters
//! km resolve --candidate acme --metrics
//! ```

use km_cli::{Cli, CliResult, logger, metrics, render, run};
use km_config::Config;
use km_session::{AppContext, MemoryNavigator};

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::LevelFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> CliResult<String> {
    let config = Config::load()?;
    config.validate()?;

    logger::initialize(
        config.logging.level,
        config.logging.file.as_ref().map(PathBuf::from),
        config.logging.colored,
    )?;
    if config.logging.level.0 >= LevelFilter::Debug {
        config.log_summary();
    }

    let recorder = metrics::install()?;

    let navigator = Arc::new(MemoryNavigator::new(
        cli.current_url(&config.identity.redirect_uri)?,
    ));
    let app = AppContext::from_config(&config, navigator.clone())?;

    let print_metrics = cli.metrics;
    let result = run(&app, &navigator, &config, cli.command).await;
    if print_metrics {
        eprint!("{}", recorder.render());
    }

    render(&result?, cli.pretty)
}
