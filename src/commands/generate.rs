//! `mockwright generate` command.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::Error;
use crate::pipeline;

/// Execute the `generate` command against the live filesystem.
///
/// # Errors
///
/// Returns an error string if the config is invalid or any stage fails.
pub fn run(config_path: &Path, tidy: bool, dry_run: bool) -> Result<(), String> {
    let config = Config::load(&LiveFileSystem, config_path).map_err(|e| e.to_string())?;
    let ctx = ServiceContext::live(&config);
    run_with_context(&ctx, &config, tidy, dry_run, &mut std::io::stdout())
}

/// Execute the `generate` command with an explicit context, reporting
/// paths to `out`.
///
/// # Errors
///
/// Returns an error string if generation, writing or tidying fails.
pub fn run_with_context(
    ctx: &ServiceContext,
    config: &Config,
    tidy: bool,
    dry_run: bool,
    out: &mut dyn Write,
) -> Result<(), String> {
    if config.packages.is_empty() {
        writeln!(out, "No packages configured.").map_err(|e| format!("write error: {e}"))?;
        return Ok(());
    }

    let mocks = pipeline::generate_mocks(ctx, &config.packages).map_err(|e| e.to_string())?;
    let tidy = tidy || config.tidy_after_generate;

    if dry_run {
        writeln!(out, "Dry run, would write:").map_err(|e| format!("write error: {e}"))?;
        // Unplaceable packages are collected like a real write would, so the
        // rest are still listed.
        let resolver = config.destinations();
        let mut failures = Vec::new();
        for mock in &mocks {
            match resolver.resolve(&mock.package.path) {
                Ok(dest) => writeln!(out, "  {}", dest.full_file_path().display())
                    .map_err(|e| format!("write error: {e}"))?,
                Err(e) => failures.push(e),
            }
        }
        if !failures.is_empty() {
            return Err(Error::Write(failures).to_string());
        }
        if tidy {
            let stale = pipeline::stale_mocks(ctx, config, &config.packages).map_err(|e| e.to_string())?;
            report(out, "would remove", &stale)?;
        }
        return Ok(());
    }

    let written = pipeline::write_mocks(ctx, config, &mocks).map_err(|e| e.to_string())?;
    report(out, "wrote", &written)?;

    if tidy {
        let removed = pipeline::tidy_mocks(ctx, config, &config.packages).map_err(|e| e.to_string())?;
        report(out, "removed", &removed)?;
    }
    Ok(())
}

pub(super) fn report(out: &mut dyn Write, verb: &str, paths: &[PathBuf]) -> Result<(), String> {
    for path in paths {
        writeln!(out, "{verb} {}", path.display()).map_err(|e| format!("write error: {e}"))?;
    }
    Ok(())
}
