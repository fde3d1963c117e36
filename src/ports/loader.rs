//! Type loader port.

use indexmap::IndexMap;

use crate::error::{PackageLoadError, PortError};
use crate::types::LoadedPackage;

/// Result of loading a batch of packages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOutcome {
    /// Packages that loaded, keyed by import path.
    pub packages: IndexMap<String, LoadedPackage>,
    /// One entry per package that failed to load or parse.
    pub errors: Vec<PackageLoadError>,
}

/// Loads type information for packages.
pub trait PackageLoader: Send + Sync {
    /// Loads every package in `paths`.
    ///
    /// Per-package failures are reported in [`LoadOutcome::errors`].
    ///
    /// # Errors
    ///
    /// Returns an error when the loader as a whole could not run.
    fn load_packages(&self, paths: &[String]) -> Result<LoadOutcome, PortError>;
}
