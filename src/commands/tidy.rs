//! `mockwright tidy` command.

use std::io::Write;
use std::path::Path;

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::pipeline;

use super::generate::report;

/// Execute the `tidy` command against the live filesystem.
///
/// # Errors
///
/// Returns an error string if the config is invalid or tidying fails.
pub fn run(config_path: &Path, dry_run: bool) -> Result<(), String> {
    let config = Config::load(&LiveFileSystem, config_path).map_err(|e| e.to_string())?;
    let ctx = ServiceContext::live(&config);
    run_with_context(&ctx, &config, dry_run, &mut std::io::stdout())
}

/// Execute the `tidy` command with an explicit context.
///
/// # Errors
///
/// Returns an error string if a destination cannot be resolved or a
/// listing or removal fails.
pub fn run_with_context(
    ctx: &ServiceContext,
    config: &Config,
    dry_run: bool,
    out: &mut dyn Write,
) -> Result<(), String> {
    if dry_run {
        let stale = pipeline::stale_mocks(ctx, config, &config.packages).map_err(|e| e.to_string())?;
        return report(out, "would remove", &stale);
    }
    let removed = pipeline::tidy_mocks(ctx, config, &config.packages).map_err(|e| e.to_string())?;
    if removed.is_empty() {
        writeln!(out, "Nothing to tidy.").map_err(|e| format!("write error: {e}"))?;
    }
    report(out, "removed", &removed)
}
