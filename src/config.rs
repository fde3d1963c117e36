//! Run configuration, read from a YAML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::destination::DestinationResolver;
use crate::error::{Error, Result};
use crate::ports::filesystem::FileSystem;
use crate::resolve::PackageSpec;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "mockwright.yaml";

/// Everything one generation run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Import path of the module mocks are generated into.
    pub module_path: String,
    /// Module directory; [`Config::load`] resolves it against the config
    /// file's directory.
    #[serde(default = "default_module_dir")]
    pub module_dir: PathBuf,
    /// Directory under the module holding mocks of public packages.
    #[serde(default = "default_primary_mock_dir")]
    pub primary_mock_dir: PathBuf,
    /// Directory name created next to each `internal` boundary.
    #[serde(default = "default_private_mock_dir_name")]
    pub private_mock_dir_name: String,
    /// Remove stale mocks after every `generate`.
    #[serde(default)]
    pub tidy_after_generate: bool,
    /// Where type information comes from.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub loader: LoaderConfig,
    /// Packages and interfaces to mock, in output order.
    #[serde(default)]
    pub packages: Vec<PackageSpec>,
}

/// Source of type information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderConfig {
    /// Run an exporter command; package paths are appended as arguments.
    Command(String),
    /// Read a previously exported YAML or JSON document.
    ExportFile(PathBuf),
}

fn default_module_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_primary_mock_dir() -> PathBuf {
    PathBuf::from("internal/mocks")
}

fn default_private_mock_dir_name() -> String {
    "mocks".to_string()
}

impl Config {
    /// Reads, parses and validates the config at `path`.
    ///
    /// `module_dir` and an export file path are resolved against the
    /// config file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read, parsed or
    /// validated.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let contents = fs
            .read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let mut config: Self = serde_yaml::from_str(&contents)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

        let base = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        config.module_dir = base.join(&config.module_dir);
        if let LoaderConfig::ExportFile(file) = &mut config.loader {
            *file = base.join(&*file);
        }

        config.validate()?;
        tracing::debug!(
            config = %path.display(),
            module = %config.module_path,
            packages = config.packages.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Checks field values serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.module_path.trim().is_empty() {
            return Err(Error::Config("module_path must not be empty".to_string()));
        }
        if self.primary_mock_dir.as_os_str().is_empty() {
            return Err(Error::Config("primary_mock_dir must not be empty".to_string()));
        }
        if self.primary_mock_dir.is_absolute() {
            return Err(Error::Config(format!(
                "primary_mock_dir must be relative to the module, got {}",
                self.primary_mock_dir.display()
            )));
        }
        if self.private_mock_dir_name.is_empty() {
            return Err(Error::Config("private_mock_dir_name must not be empty".to_string()));
        }
        if Path::new(&self.private_mock_dir_name).is_absolute() {
            return Err(Error::Config(format!(
                "private_mock_dir_name must be relative, got {}",
                self.private_mock_dir_name
            )));
        }
        Ok(())
    }

    /// Destination resolver for this module.
    #[must_use]
    pub fn destinations(&self) -> DestinationResolver {
        DestinationResolver::new(
            &self.module_dir,
            &self.module_path,
            &self.primary_mock_dir,
            &self.private_mock_dir_name,
        )
    }
}
