//! Command implementations for the Hall processor CLI
//!
//! Each command lives in its own module; shared logging, configuration and
//! discovery helpers are in [`shared`].

pub mod inspect;
pub mod instrument;
pub mod process;
pub mod shared;

pub use shared::ProcessingStats;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Main command runner for the Hall processor
///
/// Dispatches to the subcommand handler:
/// - `process`: measurement logs to measurement and experiment archives
/// - `instrument`: instrument templates to instrument archives
/// - `inspect`: parsed view of a single log
pub async fn run(args: Args) -> Result<ProcessingStats> {
    match args.command {
        Some(Commands::Process(process_args)) => process::run_process(process_args).await,
        Some(Commands::Instrument(instrument_args)) => {
            instrument::run_instrument(instrument_args).await
        }
        Some(Commands::Inspect(inspect_args)) => inspect::run_inspect(inspect_args).await,
        None => Err(Error::configuration("no command given")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_without_command_is_configuration_error() {
        let result = run(Args { command: None }).await;
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }
}
