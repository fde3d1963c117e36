//! Command dispatch and handlers.

pub mod generate;
pub mod tidy;

use crate::cli::Command;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Generate { config, tidy, dry_run } => generate::run(config, *tidy, *dry_run),
        Command::Tidy { config, dry_run } => tidy::run(config, *dry_run),
    }
}
