//! Core library entry for the `mockwright` CLI.
//!
//! The pipeline resolves Go interfaces from exported type information,
//! synthesizes one mock file per package, places each file next to the code
//! allowed to import it and removes mocks that are no longer generated.

pub mod adapters;
pub mod alias;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod destination;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod ports;
pub mod resolve;
pub mod synth;
pub mod types;
pub mod writer;

use clap::Parser;

pub use error::{Error, Result};

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> std::result::Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    logging::init(cli.verbose);
    commands::dispatch(&cli.command)
}
