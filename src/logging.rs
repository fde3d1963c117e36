//! Process-wide log output.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the stderr subscriber once per process.
///
/// `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
/// when `verbose` is set. Later calls are no-ops.
pub fn init(verbose: bool) {
    static INITIALISED: OnceLock<()> = OnceLock::new();

    INITIALISED.get_or_init(|| {
        let default = if verbose { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        let use_ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();

        let subscriber = fmt::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(use_ansi)
            .with_target(false)
            .without_time()
            .compact()
            .finish();
        // A subscriber installed by the embedding process wins.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
