//! Error taxonomy for the generation pipeline.

use std::fmt;
use std::path::PathBuf;

/// Boxed error returned by port implementations.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while resolving, synthesizing, placing or tidying mocks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested packages or interfaces are malformed or do not exist.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// One or more packages failed to load.
    #[error("failed to load {} package(s):\n{}", .0.len(), join_lines(.0))]
    ExternalLoad(Vec<PackageLoadError>),

    /// A condition that correct input validation should have made unreachable.
    #[error("internal error: {0}")]
    Internal(String),

    /// A private package sits outside the module it is generated for.
    #[error(
        "package {package_path} is behind an internal boundary but does not belong to module \
         {module_path}"
    )]
    Destination {
        /// Offending package path.
        package_path: String,
        /// Module path the package was expected to live under.
        module_path: String,
    },

    /// A filesystem operation failed.
    #[error("failed to {op} {}: {source}", path.display())]
    Fs {
        /// Operation that failed.
        op: FsOp,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: PortError,
    },

    /// Some mocks could not be written; the rest were.
    #[error("failed to write {} mock(s):\n{}", .0.len(), join_lines(.0))]
    Write(Vec<Error>),

    /// The configuration file is unreadable or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wraps a port failure with the operation and path it concerned.
    pub fn fs(op: FsOp, path: impl Into<PathBuf>, source: PortError) -> Self {
        Self::Fs { op, path: path.into(), source }
    }
}

/// Filesystem operation named in [`Error::Fs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOp {
    /// Reading a file.
    Read,
    /// Creating a directory tree.
    CreateDir,
    /// Writing a file.
    Write,
    /// Listing a directory tree.
    List,
    /// Removing a file or directory tree.
    Remove,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Read => "read",
            Self::CreateDir => "create directory",
            Self::Write => "write",
            Self::List => "list",
            Self::Remove => "remove",
        };
        f.write_str(verb)
    }
}

/// A single package the loader could not load or parse.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PackageLoadError {
    /// Package path that failed.
    pub path: String,
    /// Loader-supplied description of the failure.
    pub message: String,
}

impl fmt::Display for PackageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn join_lines<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(|item| format!("  - {item}")).collect::<Vec<_>>().join("\n")
}
