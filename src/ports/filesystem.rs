//! Filesystem port for file I/O operations.

use std::path::{Path, PathBuf};

use crate::error::PortError;

/// Provides the narrow set of filesystem operations the pipeline needs.
///
/// Abstracting the filesystem lets the writer and reconciler run against an
/// in-memory tree in tests without touching the real disk.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, PortError>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Writes the given contents to a file, creating or overwriting it.
    ///
    /// The parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write_file(&self, path: &Path, contents: &str, mode: u32) -> Result<(), PortError>;

    /// Creates a directory and all missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if any directory cannot be created.
    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<(), PortError>;

    /// Lists every file and directory below `root`, excluding `root` itself.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` or one of its descendants cannot be read.
    fn list_recursive(&self, root: &Path) -> Result<Vec<PathBuf>, PortError>;

    /// Removes a file, or a directory and everything below it.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be removed.
    fn remove_all(&self, path: &Path) -> Result<(), PortError>;
}
