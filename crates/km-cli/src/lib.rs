//! km-cli library
//!
//! Command definitions and the dispatcher behind the `km` binary, exported
//! for tests.

pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod error;
pub mod logger;
pub mod metrics;
pub(crate) mod runner;
pub(crate) mod tenant_commands;


pub use cli::Cli;
pub use commands::Commands;
pub use error::{CliError, Result as CliResult};
pub use runner::{render, run};
pub use tenant_commands::TenantCommands;
