#![allow(clippy::enum_variant_names)]

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser as _;
use snafu::ResultExt;
use tracing::debug;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use crate::{
    application::{Application, ApplicationError, LogFileSnafu},
    cli::Cli,
};

mod application;
mod cli;
mod ext;
mod mirror;
mod reconcile;
mod report;

#[compio::main]
#[snafu::report]
async fn main() -> Result<(), ApplicationError> {
    let cli_args = Cli::parse();
    setup_tracing(&cli_args)?;
    debug!("Parsed CLI arguments: {cli_args:?}");

    Application::run(cli_args).await?;

    Ok(())
}

/// Sends log lines to stdout and appends them to the configured log file.
///
/// With `--log-level silent` nothing is installed and the log file is not
/// touched.
fn setup_tracing(cli_args: &Cli) -> Result<(), ApplicationError> {
    let Some(level) = cli_args.log_level.to_tracing_level() else {
        return Ok(());
    };

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli_args.log_file)
        .context(LogFileSnafu {
            path: &cli_args.log_file,
        })?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_writer(std::io::stdout.and(Mutex::new(log_file)))
        .init();

    Ok(())
}
