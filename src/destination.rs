//! Where generated mocks live on disk.
//!
//! Public packages get their mocks under one shared directory in the module.
//! A package behind an `internal` boundary can only be imported from beneath
//! that boundary's parent, so its mocks go in a directory next to the
//! boundary instead.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const BOUNDARY: &str = "/internal/";

/// Resolved placement of one package's mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Directory the mock subdirectory is placed under.
    pub root: PathBuf,
    /// Directory under `root` holding all mocks for this root.
    pub mock_subdirectory: PathBuf,
    /// Package path fragment that determines the file location.
    pub base_fragment: String,
}

impl Destination {
    /// `root` joined with `mock_subdirectory`; tidy works per mock root.
    #[must_use]
    pub fn mock_root(&self) -> PathBuf {
        self.root.join(&self.mock_subdirectory)
    }

    /// Full path of the generated file.
    ///
    /// `a/b/pkg` becomes `<mock root>/a/b/mock_pkg/mock_pkg.go`.
    #[must_use]
    pub fn full_file_path(&self) -> PathBuf {
        let (dir, base) = match self.base_fragment.rsplit_once('/') {
            Some((dir, base)) => (Some(dir), base),
            None => (None, self.base_fragment.as_str()),
        };
        let mut path = self.mock_root();
        if let Some(dir) = dir.filter(|d| !d.is_empty()) {
            path.push(dir);
        }
        path.push(format!("mock_{base}"));
        path.push(format!("mock_{base}.go"));
        path
    }
}

/// Maps package paths to [`Destination`]s for one module.
#[derive(Debug, Clone)]
pub struct DestinationResolver {
    module_dir: PathBuf,
    module_path: String,
    primary_mock_dir: PathBuf,
    private_mock_dir_name: String,
}

impl DestinationResolver {
    /// Creates a resolver for the module rooted at `module_dir` whose import
    /// path is `module_path`.
    pub fn new(
        module_dir: impl Into<PathBuf>,
        module_path: impl Into<String>,
        primary_mock_dir: impl Into<PathBuf>,
        private_mock_dir_name: impl Into<String>,
    ) -> Self {
        Self {
            module_dir: module_dir.into(),
            module_path: module_path.into(),
            primary_mock_dir: primary_mock_dir.into(),
            private_mock_dir_name: private_mock_dir_name.into(),
        }
    }

    /// Module directory on disk.
    #[must_use]
    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    /// Resolves where the mock for `package_path` is written.
    ///
    /// For packages inside the module only the module-relative part of the
    /// path is searched for a boundary, so a module whose own path contains
    /// `internal` still gets public placement for its public packages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Destination`] for a package behind an `internal`
    /// boundary that does not belong to this module.
    pub fn resolve(&self, package_path: &str) -> Result<Destination> {
        let relative = package_path
            .strip_prefix(self.module_path.as_str())
            .filter(|rest| !self.module_path.is_empty() && (rest.is_empty() || rest.starts_with('/')));

        let Some(relative) = relative else {
            if package_path.contains(BOUNDARY) {
                return Err(Error::Destination {
                    package_path: package_path.to_string(),
                    module_path: self.module_path.clone(),
                });
            }
            return Ok(self.public(package_path));
        };

        // `relative` is empty for the module's root package, otherwise it
        // starts with '/' and a boundary right after the module path is
        // found at index 0.
        let Some(idx) = relative.rfind(BOUNDARY) else {
            return Ok(self.public(package_path));
        };
        let prefix = relative[..idx].trim_start_matches('/');
        let suffix = &relative[idx + BOUNDARY.len()..];

        let mut root = self.module_dir.clone();
        if !prefix.is_empty() {
            root.push(prefix);
        }
        root.push("internal");

        Ok(Destination {
            root,
            mock_subdirectory: PathBuf::from(&self.private_mock_dir_name),
            base_fragment: suffix.to_string(),
        })
    }

    fn public(&self, package_path: &str) -> Destination {
        Destination {
            root: self.module_dir.clone(),
            mock_subdirectory: self.primary_mock_dir.clone(),
            base_fragment: package_path.to_string(),
        }
    }
}
