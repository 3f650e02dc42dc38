use crate::{CliError, CliResult, commands::Commands};

use clap::Parser;
use url::Url;

#[derive(Parser)]
#[command(name = "km")]
#[command(about = "Keymatic console session and tenant CLI")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Address the console is "open" at (defaults to the configured redirect URI)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Print the run's counters to stderr in Prometheus text format
    #[arg(long, global = true)]
    pub metrics: bool,
}

impl Cli {
    /// Page the session starts on. A `callback` command lands on its own URL.
    pub fn current_url(&self, redirect_uri: &str) -> CliResult<Url> {
        let raw = match self.command {
            Commands::Callback { ref url } => url.as_str(),
            _ => self.url.as_deref().unwrap_or(redirect_uri),
        };

        Url::parse(raw).map_err(|e| CliError::invalid_argument(format!("Invalid URL '{raw}': {e}")))
    }
}
