//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;

/// Top-level CLI parser for `mockwright`.
#[derive(Debug, Parser)]
#[command(name = "mockwright", version, about = "Generate and reconcile Go interface mocks")]
pub struct Cli {
    /// Log debug detail (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate mocks for every configured interface and write them.
    Generate {
        /// Path to the configuration file.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Remove stale mocks afterwards.
        #[arg(long)]
        tidy: bool,
        /// Print destinations without writing or removing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove mock files and directories that are no longer generated.
    Tidy {
        /// Path to the configuration file.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// List stale paths without removing them.
        #[arg(long)]
        dry_run: bool,
    },
}
