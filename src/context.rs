//! Service context bundling all port trait objects.

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::loader::{CommandPackageLoader, ExportFilePackageLoader};
use crate::adapters::live::shell::LiveShellExecutor;
use crate::config::{Config, LoaderConfig};
use crate::ports::filesystem::FileSystem;
use crate::ports::loader::PackageLoader;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations.
pub struct ServiceContext {
    /// Filesystem for reading config and writing or tidying mocks.
    pub fs: Box<dyn FileSystem>,
    /// Source of package type information.
    pub loader: Box<dyn PackageLoader>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(fs: Box<dyn FileSystem>, loader: Box<dyn PackageLoader>) -> Self {
        Self { fs, loader }
    }

    /// Creates a live context whose loader follows `config`.
    ///
    /// An exporter command runs from the module directory.
    #[must_use]
    pub fn live(config: &Config) -> Self {
        let loader: Box<dyn PackageLoader> = match &config.loader {
            LoaderConfig::Command(command) => Box::new(
                CommandPackageLoader::new(Box::new(LiveShellExecutor), command.clone())
                    .in_dir(&config.module_dir),
            ),
            LoaderConfig::ExportFile(path) => {
                Box::new(ExportFilePackageLoader::new(Box::new(LiveFileSystem), path.clone()))
            }
        };
        Self { fs: Box::new(LiveFileSystem), loader }
    }
}
